//! Recording fakes for every collaborator.
//!
//! Each fake appends a [`Call`] to a shared [`CallLog`] before doing anything
//! else, so tests can assert call counts and the relative order of calls
//! across different collaborators. Failures are switched on through public
//! fields before the fakes are wired into an engine.
//!
//! Typical use: build [`AuthFakes`] or [`OrderFakes`], flip the failure
//! switch under test (`fakes.hasher.fail = true`), call `build()`, drive the
//! engine on the returned harness, then inspect `harness.log.calls()`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::StreamExt;

use bookshelf_core::{BookId, Email, OrderId, UserId};

use crate::context::Context;
use crate::models::{Book, Order, OrderQuery, PaginatedOrders, User};
use crate::providers::{
    CatalogError, ContentCatalog, ContentStream, CredentialStore, HashError, IdGenerator,
    NotificationError, NotificationSender, OrderStore, PasswordGenerator, PasswordHasher,
    PaymentError, PaymentIntent, PaymentProcessor, StoreError, TokenError, TokenIssuer,
};
use crate::services::auth::{AuthCollaborators, Authenticator};
use crate::services::orders::OrderWorkflow;

const INJECTED: &str = "injected failure";

/// A single collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NewId,
    Hash(String),
    Compare { hash: String, plaintext: String },
    IssueToken(UserId),
    GeneratePassword,
    FindUserByEmail(Email),
    SaveUser(User),
    UpdateUser(User),
    SendPasswordReset { user_id: UserId, password: String },
    FindBook(BookId),
    GetBookContent(BookId),
    CreatePaymentIntent(Order),
    FindOrders(OrderQuery),
    FindOrder(OrderId),
    CreateOrder(Order),
    UpdateOrder(Order),
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    /// Position of the first call matching `pred`.
    #[must_use]
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

// =============================================================================
// Auth collaborators
// =============================================================================

/// In-memory credential store keyed by email.
#[derive(Debug)]
pub struct FakeCredentialStore {
    log: CallLog,
    users: Mutex<HashMap<Email, User>>,
    /// Fail `find_by_email` with a backend error.
    pub fail_find: bool,
    /// Fail `save` with a backend error.
    pub fail_save: bool,
    /// Fail `update` with a backend error.
    pub fail_update: bool,
}

impl FakeCredentialStore {
    /// Create an empty store recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            users: Mutex::new(HashMap::new()),
            fail_find: false,
            fail_save: false,
            fail_update: false,
        }
    }

    /// Seed a user without recording a call.
    pub fn insert(&self, user: User) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.email.clone(), user);
    }

    /// Current stored state of a user.
    #[must_use]
    pub fn get(&self, email: &Email) -> Option<User> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for FakeCredentialStore {
    async fn find_by_email(&self, _ctx: &Context, email: &Email) -> Result<User, StoreError> {
        self.log.record(Call::FindUserByEmail(email.clone()));
        if self.fail_find {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.get(email)
            .ok_or_else(|| StoreError::NotFound(format!("user {email}")))
    }

    async fn save(&self, _ctx: &Context, user: &User) -> Result<(), StoreError> {
        self.log.record(Call::SaveUser(user.clone()));
        if self.fail_save {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.insert(user.clone());
        Ok(())
    }

    async fn update(&self, _ctx: &Context, user: &User) -> Result<(), StoreError> {
        self.log.record(Call::UpdateUser(user.clone()));
        if self.fail_update {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.insert(user.clone());
        Ok(())
    }
}

/// Deterministic hasher: `hash(p)` is `"hash:" + p` unless `fixed_hash` is set.
#[derive(Debug)]
pub struct FakeHasher {
    log: CallLog,
    /// Value returned by every `hash` call.
    pub fixed_hash: Option<String>,
    /// Fail `hash` with an internal error.
    pub fail: bool,
}

impl FakeHasher {
    /// Create a hasher recording into `log`.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
            fixed_hash: None,
            fail: false,
        }
    }

    /// The hash this fake produces for `plaintext` when no fixed hash is set.
    #[must_use]
    pub fn hash_of(plaintext: &str) -> String {
        format!("hash:{plaintext}")
    }
}

#[async_trait]
impl PasswordHasher for FakeHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        self.log.record(Call::Hash(plaintext.to_owned()));
        if self.fail {
            return Err(HashError::Internal(INJECTED.to_owned()));
        }
        Ok(self
            .fixed_hash
            .clone()
            .unwrap_or_else(|| Self::hash_of(plaintext)))
    }

    async fn compare(&self, hash: &str, plaintext: &str) -> Result<(), HashError> {
        self.log.record(Call::Compare {
            hash: hash.to_owned(),
            plaintext: plaintext.to_owned(),
        });
        if hash == Self::hash_of(plaintext) {
            Ok(())
        } else {
            Err(HashError::Mismatch)
        }
    }
}

/// Token issuer returning `token` (default `"token-<user id>"`).
#[derive(Debug)]
pub struct FakeTokenIssuer {
    log: CallLog,
    /// Value returned by every `issue_for` call.
    pub token: Option<String>,
    /// Fail with a signing error.
    pub fail: bool,
}

impl FakeTokenIssuer {
    /// Create an issuer recording into `log`.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
            token: None,
            fail: false,
        }
    }
}

impl TokenIssuer for FakeTokenIssuer {
    fn issue_for(&self, user: &User) -> Result<String, TokenError> {
        self.log.record(Call::IssueToken(user.id.clone()));
        if self.fail {
            return Err(TokenError::Signing(INJECTED.to_owned()));
        }
        Ok(self
            .token
            .clone()
            .unwrap_or_else(|| format!("token-{}", user.id)))
    }
}

/// Password generator returning `password`.
#[derive(Debug)]
pub struct FakePasswordGenerator {
    log: CallLog,
    /// Value returned by every `generate` call.
    pub password: String,
}

impl FakePasswordGenerator {
    /// Create a generator recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            password: "generated-password".to_owned(),
        }
    }
}

impl PasswordGenerator for FakePasswordGenerator {
    fn generate(&self) -> String {
        self.log.record(Call::GeneratePassword);
        self.password.clone()
    }
}

/// ID generator returning `id`.
#[derive(Debug)]
pub struct FakeIdGenerator {
    log: CallLog,
    /// Value returned by every `new_id` call.
    pub id: String,
}

impl FakeIdGenerator {
    /// Create a generator recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            id: "user-id".to_owned(),
        }
    }
}

impl IdGenerator for FakeIdGenerator {
    fn new_id(&self) -> String {
        self.log.record(Call::NewId);
        self.id.clone()
    }
}

/// Notification sender that only records.
#[derive(Debug)]
pub struct FakeNotificationSender {
    log: CallLog,
    /// Fail with a delivery error.
    pub fail: bool,
}

impl FakeNotificationSender {
    /// Create a sender recording into `log`.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }
}

#[async_trait]
impl NotificationSender for FakeNotificationSender {
    async fn send_password_reset(
        &self,
        _ctx: &Context,
        user: &User,
        new_password: &str,
    ) -> Result<(), NotificationError> {
        self.log.record(Call::SendPasswordReset {
            user_id: user.id.clone(),
            password: new_password.to_owned(),
        });
        if self.fail {
            return Err(NotificationError::Delivery(INJECTED.to_owned()));
        }
        Ok(())
    }
}

/// Unwired auth fakes sharing one log. Flip failure switches, then `build`.
#[derive(Debug)]
pub struct AuthFakes {
    pub log: CallLog,
    pub users: FakeCredentialStore,
    pub hasher: FakeHasher,
    pub tokens: FakeTokenIssuer,
    pub passwords: FakePasswordGenerator,
    pub ids: FakeIdGenerator,
    pub notifier: FakeNotificationSender,
}

impl Default for AuthFakes {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFakes {
    /// Create fakes that all succeed.
    #[must_use]
    pub fn new() -> Self {
        let log = CallLog::new();
        Self {
            users: FakeCredentialStore::new(log.clone()),
            hasher: FakeHasher::new(log.clone()),
            tokens: FakeTokenIssuer::new(log.clone()),
            passwords: FakePasswordGenerator::new(log.clone()),
            ids: FakeIdGenerator::new(log.clone()),
            notifier: FakeNotificationSender::new(log.clone()),
            log,
        }
    }

    /// Wire the fakes into an [`Authenticator`].
    #[must_use]
    pub fn build(self) -> AuthHarness {
        let users = Arc::new(self.users);
        let authenticator = Authenticator::new(AuthCollaborators {
            users: users.clone(),
            hasher: Arc::new(self.hasher),
            tokens: Arc::new(self.tokens),
            passwords: Arc::new(self.passwords),
            ids: Arc::new(self.ids),
            notifier: Arc::new(self.notifier),
        });
        AuthHarness {
            log: self.log,
            users,
            authenticator,
        }
    }
}

/// A wired authenticator plus handles for assertions.
pub struct AuthHarness {
    pub log: CallLog,
    pub users: Arc<FakeCredentialStore>,
    pub authenticator: Authenticator,
}

// =============================================================================
// Order collaborators
// =============================================================================

/// In-memory order store.
#[derive(Debug)]
pub struct FakeOrderStore {
    log: CallLog,
    orders: Mutex<HashMap<OrderId, Order>>,
    /// Fail `find_by_query` with a backend error.
    pub fail_query: bool,
    /// Fail `find_by_id` with a backend error.
    pub fail_find: bool,
    /// Fail `create` with a backend error.
    pub fail_create: bool,
    /// Fail `update` with a backend error.
    pub fail_update: bool,
}

impl FakeOrderStore {
    /// Create an empty store recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            orders: Mutex::new(HashMap::new()),
            fail_query: false,
            fail_find: false,
            fail_create: false,
            fail_update: false,
        }
    }

    /// Seed an order without recording a call.
    pub fn insert(&self, order: Order) {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.id.clone(), order);
    }

    /// Current stored state of an order.
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

#[async_trait]
impl OrderStore for FakeOrderStore {
    async fn find_by_query(
        &self,
        _ctx: &Context,
        query: &OrderQuery,
    ) -> Result<PaginatedOrders, StoreError> {
        self.log.record(Call::FindOrders(query.clone()));
        if self.fail_query {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|order| query.matches(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(PaginatedOrders {
            total_orders: orders.len() as u64,
            orders,
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn find_by_id(&self, _ctx: &Context, id: &OrderId) -> Result<Order, StoreError> {
        self.log.record(Call::FindOrder(id.clone()));
        if self.fail_find {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.get(id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))
    }

    async fn create(&self, _ctx: &Context, order: &Order) -> Result<(), StoreError> {
        self.log.record(Call::CreateOrder(order.clone()));
        if self.fail_create {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.insert(order.clone());
        Ok(())
    }

    async fn update(&self, _ctx: &Context, order: &Order) -> Result<(), StoreError> {
        self.log.record(Call::UpdateOrder(order.clone()));
        if self.fail_update {
            return Err(StoreError::Backend(INJECTED.to_owned()));
        }
        self.insert(order.clone());
        Ok(())
    }
}

/// Catalog holding books and their content chunks.
#[derive(Debug)]
pub struct FakeCatalog {
    log: CallLog,
    books: Mutex<HashMap<BookId, (Book, Vec<Vec<u8>>)>>,
    /// Fail `get_book_content` with a storage error.
    pub fail_content: bool,
}

impl FakeCatalog {
    /// Create an empty catalog recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            books: Mutex::new(HashMap::new()),
            fail_content: false,
        }
    }

    /// Add a book with its content chunks.
    pub fn insert(&self, book: Book, chunks: Vec<Vec<u8>>) {
        self.books
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book.id.clone(), (book, chunks));
    }
}

#[async_trait]
impl ContentCatalog for FakeCatalog {
    async fn find_book_by_id(&self, _ctx: &Context, id: &BookId) -> Result<Book, CatalogError> {
        self.log.record(Call::FindBook(id.clone()));
        self.books
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|(book, _)| book.clone())
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn get_book_content(
        &self,
        _ctx: &Context,
        book_id: &BookId,
    ) -> Result<ContentStream, CatalogError> {
        self.log.record(Call::GetBookContent(book_id.clone()));
        if self.fail_content {
            return Err(CatalogError::Storage(INJECTED.to_owned()));
        }
        let chunks = self
            .books
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(book_id)
            .map(|(_, chunks)| chunks.clone())
            .ok_or_else(|| CatalogError::NotFound(book_id.clone()))?;
        Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

/// Payment processor that opens `pi_<order id>` intents.
#[derive(Debug)]
pub struct FakePaymentProcessor {
    log: CallLog,
    /// Fail with a processor error.
    pub fail: bool,
}

impl FakePaymentProcessor {
    /// Create a processor recording into `log`.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }
}

#[async_trait]
impl PaymentProcessor for FakePaymentProcessor {
    async fn create_payment_intent_for_order(
        &self,
        _ctx: &Context,
        order: &Order,
    ) -> Result<PaymentIntent, PaymentError> {
        self.log.record(Call::CreatePaymentIntent(order.clone()));
        if self.fail {
            return Err(PaymentError::Processor(INJECTED.to_owned()));
        }
        Ok(PaymentIntent {
            id: format!("pi_{}", order.id),
            client_secret: format!("pi_{}_secret", order.id),
        })
    }
}

/// Unwired order fakes sharing one log. Flip failure switches, then `build`.
#[derive(Debug)]
pub struct OrderFakes {
    pub log: CallLog,
    pub orders: FakeOrderStore,
    pub catalog: FakeCatalog,
    pub payments: FakePaymentProcessor,
}

impl Default for OrderFakes {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFakes {
    /// Create fakes that all succeed.
    #[must_use]
    pub fn new() -> Self {
        let log = CallLog::new();
        Self {
            orders: FakeOrderStore::new(log.clone()),
            catalog: FakeCatalog::new(log.clone()),
            payments: FakePaymentProcessor::new(log.clone()),
            log,
        }
    }

    /// Wire the fakes into an [`OrderWorkflow`].
    #[must_use]
    pub fn build(self) -> OrderHarness {
        let orders = Arc::new(self.orders);
        let workflow = OrderWorkflow::new(
            orders.clone(),
            Arc::new(self.catalog),
            Arc::new(self.payments),
        );
        OrderHarness {
            log: self.log,
            orders,
            workflow,
        }
    }
}

/// A wired order workflow plus handles for assertions.
pub struct OrderHarness {
    pub log: CallLog,
    pub orders: Arc<FakeOrderStore>,
    pub workflow: OrderWorkflow,
}
