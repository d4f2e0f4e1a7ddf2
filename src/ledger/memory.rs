//! In-memory ledger
//!
//! Simulates the CBDC token chaincode for the `memory` ledger mode and for
//! tests. One [`InMemoryLedger`] holds the shared world state; each service
//! identity talks to it through its own [`MemorySession`].
//!
//! Sessions support fault injection per chaincode function so every ledger
//! failure class can be produced on demand, and they count calls so tests can
//! prove that an operation never reached the ledger.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::LedgerError;
use super::gateway::{CommitOutcome, LedgerGateway, SubmittedTransaction, functions};

/// Fabric validation code for a valid transaction
pub const VALID: i32 = 0;
/// Fabric validation code for an MVCC read conflict
pub const MVCC_READ_CONFLICT: i32 = 11;

/// Failure to inject into the next call of a chaincode function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Behave normally; lets a later call in the queue be the faulty one
    Pass,
    /// Take this long to endorse, then behave normally
    Delay(Duration),
    /// Gateway unreachable
    Connectivity,
    /// Endorsement refused with the given message
    Endorsement(String),
    /// Ordering rejected the endorsed transaction
    Submit,
    /// Transaction commits as invalid with the given validation code
    CommitRejected(i32),
    /// Transaction commits, but reading its status fails
    CommitStatusError,
    /// Transaction commits, but its status never arrives
    CommitHang,
    /// The evaluate/submit call itself never returns
    Hang,
}

#[derive(Debug, Clone)]
struct TokenInfo {
    name: String,
    symbol: String,
    decimals: u32,
}

struct TxRecord {
    outcome: CommitOutcome,
    status_fault: Option<Fault>,
}

struct Books {
    minter: String,
    token: Option<TokenInfo>,
    balances: HashMap<String, u64>,
    transactions: HashMap<String, TxRecord>,
}

/// Shared world state of the simulated ledger
#[derive(Clone)]
pub struct InMemoryLedger {
    books: Arc<Mutex<Books>>,
}

impl InMemoryLedger {
    /// Ledger with an initialised token whose minter is `minter`
    pub fn with_minter(minter: &str) -> Self {
        let ledger = Self::uninitialized(minter);
        ledger.books().token = Some(TokenInfo {
            name: "Indian eRupee".to_string(),
            symbol: "eINR".to_string(),
            decimals: 2,
        });
        ledger
    }

    /// Ledger where `Initialize` has not been called yet
    pub fn uninitialized(minter: &str) -> Self {
        Self {
            books: Arc::new(Mutex::new(Books {
                minter: minter.to_string(),
                token: None,
                balances: HashMap::new(),
                transactions: HashMap::new(),
            })),
        }
    }

    /// Open a session acting as `identity`
    pub fn session(&self, identity: &str) -> MemorySession {
        MemorySession {
            ledger: self.clone(),
            identity: identity.to_string(),
            faults: Mutex::new(HashMap::new()),
            evaluate_calls: Mutex::new(HashMap::new()),
            submit_calls: Mutex::new(HashMap::new()),
        }
    }

    /// Credit `account` directly, bypassing the chaincode
    pub fn seed(&self, account: &str, amount: u64) {
        *self.books().balances.entry(account.to_string()).or_default() += amount;
    }

    /// Balance of `account`, zero if it has no on-chain record
    pub fn balance(&self, account: &str) -> u64 {
        self.books().balances.get(account).copied().unwrap_or(0)
    }

    pub fn is_initialized(&self) -> bool {
        self.books().token.is_some()
    }

    /// Number of transactions recorded, valid or not
    pub fn transaction_count(&self) -> usize {
        self.books().transactions.len()
    }

    fn books(&self) -> MutexGuard<'_, Books> {
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One identity's connection to an [`InMemoryLedger`]
pub struct MemorySession {
    ledger: InMemoryLedger,
    identity: String,
    faults: Mutex<HashMap<String, VecDeque<Fault>>>,
    evaluate_calls: Mutex<HashMap<String, usize>>,
    submit_calls: Mutex<HashMap<String, usize>>,
}

impl MemorySession {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Queue a fault for the next call of `function`
    pub fn inject(&self, function: &str, fault: Fault) {
        lock(&self.faults)
            .entry(function.to_string())
            .or_default()
            .push_back(fault);
    }

    pub fn submit_count(&self, function: &str) -> usize {
        lock(&self.submit_calls).get(function).copied().unwrap_or(0)
    }

    pub fn evaluate_count(&self, function: &str) -> usize {
        lock(&self.evaluate_calls).get(function).copied().unwrap_or(0)
    }

    /// Every evaluate and submit call made through this session
    pub fn total_calls(&self) -> usize {
        lock(&self.evaluate_calls).values().sum::<usize>()
            + lock(&self.submit_calls).values().sum::<usize>()
    }

    fn next_fault(&self, function: &str) -> Option<Fault> {
        lock(&self.faults)
            .get_mut(function)
            .and_then(|queue| queue.pop_front())
    }

    fn count(calls: &Mutex<HashMap<String, usize>>, function: &str) {
        *lock(calls).entry(function.to_string()).or_default() += 1;
    }

    fn query(&self, function: &str, args: &[String]) -> Result<String, String> {
        let books = self.ledger.books();
        if function != functions::CLIENT_ACCOUNT_ID {
            require_initialized(&books)?;
        }
        match function {
            functions::NAME => Ok(books.token.as_ref().map(|t| t.name.clone()).unwrap_or_default()),
            functions::SYMBOL => Ok(books
                .token
                .as_ref()
                .map(|t| t.symbol.clone())
                .unwrap_or_default()),
            functions::DECIMALS => Ok(books
                .token
                .as_ref()
                .map(|t| t.decimals.to_string())
                .unwrap_or_default()),
            functions::CLIENT_ACCOUNT_ID => Ok(self.identity.clone()),
            functions::CLIENT_ACCOUNT_BALANCE => balance_of(&books, &self.identity),
            functions::BALANCE_OF => {
                let account = arg(args, 0)?;
                balance_of(&books, account)
            }
            other => Err(format!("Invalid function name: {}", other)),
        }
    }

    /// Endorse and apply a transaction against the books
    fn execute(&self, books: &mut Books, function: &str, args: &[String]) -> Result<(), String> {
        match function {
            functions::INITIALIZE => {
                if self.identity != books.minter {
                    return Err("client is not authorized to initialize contract".to_string());
                }
                if books.token.is_some() {
                    return Err("contract options are already set, client is not authorized to change them".to_string());
                }
                let decimals = arg(args, 2)?
                    .parse::<u32>()
                    .map_err(|e| format!("invalid decimals: {}", e))?;
                books.token = Some(TokenInfo {
                    name: arg(args, 0)?.to_string(),
                    symbol: arg(args, 1)?.to_string(),
                    decimals,
                });
                Ok(())
            }
            functions::MINT => {
                require_initialized(books)?;
                if self.identity != books.minter {
                    return Err("client is not authorized to mint new tokens".to_string());
                }
                let amount = parse_amount(arg(args, 0)?)?;
                let balance = books.balances.entry(self.identity.clone()).or_default();
                *balance = balance
                    .checked_add(amount)
                    .ok_or_else(|| "balance overflow".to_string())?;
                Ok(())
            }
            functions::TRANSFER => {
                require_initialized(books)?;
                let to = arg(args, 0)?;
                let amount = parse_amount(arg(args, 1)?)?;
                move_funds(books, &self.identity, to, amount)
            }
            functions::TRANSFER_FROM => {
                require_initialized(books)?;
                let from = arg(args, 0)?;
                let to = arg(args, 1)?;
                let amount = parse_amount(arg(args, 2)?)?;
                move_funds(books, from, to, amount)
            }
            other => Err(format!("Invalid function name: {}", other)),
        }
    }
}

#[async_trait]
impl LedgerGateway for MemorySession {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        Self::count(&self.evaluate_calls, function);

        match self.next_fault(function) {
            Some(Fault::Hang) => return std::future::pending().await,
            Some(Fault::Delay(delay)) => tokio::time::sleep(delay).await,
            Some(Fault::Connectivity) => {
                return Err(LedgerError::Connectivity("connection refused".to_string()));
            }
            Some(Fault::Endorsement(message)) => {
                return Err(LedgerError::Endorsement {
                    transaction_id: None,
                    message,
                });
            }
            _ => {}
        }

        self.query(function, args)
            .map(String::into_bytes)
            .map_err(|message| LedgerError::Endorsement {
                transaction_id: None,
                message,
            })
    }

    async fn submit(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<SubmittedTransaction, LedgerError> {
        Self::count(&self.submit_calls, function);
        let transaction_id = format!("{:032x}", ulid::Ulid::new().0);

        let fault = self.next_fault(function);
        match &fault {
            Some(Fault::Hang) => return std::future::pending().await,
            Some(Fault::Delay(delay)) => tokio::time::sleep(*delay).await,
            Some(Fault::Connectivity) => {
                return Err(LedgerError::Connectivity("connection refused".to_string()));
            }
            Some(Fault::Endorsement(message)) => {
                return Err(LedgerError::Endorsement {
                    transaction_id: Some(transaction_id),
                    message: message.clone(),
                });
            }
            Some(Fault::Submit) => {
                return Err(LedgerError::Submit {
                    transaction_id: Some(transaction_id),
                    message: "orderer rejected broadcast".to_string(),
                });
            }
            _ => {}
        }

        let mut books = self.ledger.books();
        let outcome = if let Some(Fault::CommitRejected(code)) = fault {
            // Endorsed but invalidated at commit: no state change
            CommitOutcome {
                transaction_id: transaction_id.clone(),
                successful: false,
                code,
            }
        } else {
            self.execute(&mut books, function, args)
                .map_err(|message| LedgerError::Endorsement {
                    transaction_id: Some(transaction_id.clone()),
                    message,
                })?;
            CommitOutcome {
                transaction_id: transaction_id.clone(),
                successful: true,
                code: VALID,
            }
        };

        debug!(tx_id = %transaction_id, function, identity = %self.identity, "memory ledger recorded transaction");
        books.transactions.insert(
            transaction_id.clone(),
            TxRecord {
                outcome,
                status_fault: fault.filter(|f| matches!(f, Fault::CommitStatusError | Fault::CommitHang)),
            },
        );

        Ok(SubmittedTransaction { transaction_id })
    }

    async fn commit_status(&self, transaction_id: &str) -> Result<CommitOutcome, LedgerError> {
        let lookup = {
            let books = self.ledger.books();
            books
                .transactions
                .get(transaction_id)
                .map(|record| (record.outcome.clone(), record.status_fault.clone()))
        };

        match lookup {
            None => Err(LedgerError::CommitStatus {
                transaction_id: transaction_id.to_string(),
                message: "unknown transaction".to_string(),
            }),
            Some((_, Some(Fault::CommitHang))) => std::future::pending().await,
            Some((_, Some(Fault::CommitStatusError))) => Err(LedgerError::CommitStatus {
                transaction_id: transaction_id.to_string(),
                message: "commit status stream closed".to_string(),
            }),
            Some((outcome, _)) => Ok(outcome),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_initialized(books: &Books) -> Result<(), String> {
    if books.token.is_none() {
        return Err("contract options need to be set before calling any function, call Initialize() to initialize contract".to_string());
    }
    Ok(())
}

fn arg(args: &[String], index: usize) -> Result<&str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument {}", index))
}

fn parse_amount(raw: &str) -> Result<u64, String> {
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(format!("amount must be a positive integer: {}", raw)),
        Ok(value) => Ok(value),
    }
}

fn balance_of(books: &Books, account: &str) -> Result<String, String> {
    books
        .balances
        .get(account)
        .map(u64::to_string)
        .ok_or_else(|| format!("the account {} does not exist", account))
}

fn move_funds(books: &mut Books, from: &str, to: &str, amount: u64) -> Result<(), String> {
    if from == to {
        return Err("cannot transfer to and from same client account".to_string());
    }
    let from_balance = books
        .balances
        .get(from)
        .copied()
        .ok_or_else(|| format!("client account {} has no balance", from))?;
    if from_balance < amount {
        return Err(format!("client account {} has insufficient funds", from));
    }
    let to_balance = books.balances.get(to).copied().unwrap_or(0);
    let credited = to_balance
        .checked_add(amount)
        .ok_or_else(|| "addition overflow".to_string())?;

    books.balances.insert(from.to_string(), from_balance - amount);
    books.balances.insert(to.to_string(), credited);
    Ok(())
}
