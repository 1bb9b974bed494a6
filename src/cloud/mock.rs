//! A scriptable test double for [`Cloud`](super::Cloud).
//!
//! Every family exposes one callback slot per operation. A call hits the
//! slot if one is set, falls through to the wrapped client if the mock wraps
//! one, and otherwise fails with a recognizable error so a test that forgot
//! to arm a slot fails loudly instead of hanging.

use super::{
    accounts, actions, domains, droplets, firewalls, floating_ips, images, keys, load_balancers,
    regions, sizes, snapshots, tags, volumes, Cloud,
};
use crate::api::types::{
    Account, Action, Domain, DomainRecord, Droplet, Firewall, FloatingIp, ForwardingRule, Image,
    InboundRule, Key, LoadBalancer, OutboundRule, Region, Size, Snapshot, Tag, TagResource, Volume,
};
use crate::api::ApiError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{channel, Receiver};
use tokio_util::sync::CancellationToken;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn mock_gap(what: &str) -> ApiError {
    ApiError::Remote(format!("{what} is not implemented by this mock"))
}

/// Build the channel pair a `list` slot returns, preloaded with `items`.
pub fn channel_of<T: Send + 'static>(items: Vec<T>) -> (Receiver<T>, Receiver<ApiError>) {
    let (tx, rx) = channel(items.len().max(1));
    for item in items {
        let _ = tx.try_send(item);
    }
    let (_etx, erx) = channel(1);
    (rx, erx)
}

/// Build the channel pair a `list` slot returns when the listing should fail.
pub fn channel_err<T: Send + 'static>(err: ApiError) -> (Receiver<T>, Receiver<ApiError>) {
    let (_tx, rx) = channel(1);
    let (etx, erx) = channel(1);
    let _ = etx.try_send(err);
    (rx, erx)
}

type ListPair<T> = (Receiver<T>, Receiver<ApiError>);

pub struct MockCloud {
    pub accounts: Arc<MockAccounts>,
    pub actions: Arc<MockActions>,
    pub domains: Arc<MockDomains>,
    pub droplets: Arc<MockDroplets>,
    pub firewalls: Arc<MockFirewalls>,
    pub floating_ips: Arc<MockFloatingIps>,
    pub images: Arc<MockImages>,
    pub keys: Arc<MockKeys>,
    pub load_balancers: Arc<MockLoadBalancers>,
    pub regions: Arc<MockRegions>,
    pub sizes: Arc<MockSizes>,
    pub snapshots: Arc<MockSnapshots>,
    pub tags: Arc<MockTags>,
    pub volumes: Arc<MockVolumes>,
}

impl MockCloud {
    /// A mock with every slot empty and nothing to fall back to.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accounts: Arc::new(MockAccounts::default()),
            actions: Arc::new(MockActions::default()),
            domains: Arc::new(MockDomains::default()),
            droplets: Arc::new(MockDroplets::default()),
            firewalls: Arc::new(MockFirewalls::default()),
            floating_ips: Arc::new(MockFloatingIps::default()),
            images: Arc::new(MockImages::default()),
            keys: Arc::new(MockKeys::default()),
            load_balancers: Arc::new(MockLoadBalancers::default()),
            regions: Arc::new(MockRegions::default()),
            sizes: Arc::new(MockSizes::default()),
            snapshots: Arc::new(MockSnapshots::default()),
            tags: Arc::new(MockTags::default()),
            volumes: Arc::new(MockVolumes::default()),
        })
    }

    /// A mock that forwards unarmed operations to `inner`.
    pub fn wrapping(inner: Arc<dyn Cloud>) -> Arc<Self> {
        let mock = Self::new();
        *lock(&mock.accounts.inner) = Some(inner.accounts());
        *lock(&mock.actions.inner) = Some(inner.actions());
        *lock(&mock.domains.inner) = Some(inner.domains());
        *lock(&mock.droplets.inner) = Some(inner.droplets());
        *lock(&mock.firewalls.inner) = Some(inner.firewalls());
        *lock(&mock.floating_ips.inner) = Some(inner.floating_ips());
        *lock(&mock.images.inner) = Some(inner.images());
        *lock(&mock.keys.inner) = Some(inner.keys());
        *lock(&mock.load_balancers.inner) = Some(inner.load_balancers());
        *lock(&mock.regions.inner) = Some(inner.regions());
        *lock(&mock.sizes.inner) = Some(inner.sizes());
        *lock(&mock.snapshots.inner) = Some(inner.snapshots());
        *lock(&mock.tags.inner) = Some(inner.tags());
        *lock(&mock.volumes.inner) = Some(inner.volumes());
        mock
    }
}

impl Cloud for MockCloud {
    fn accounts(&self) -> Arc<dyn accounts::Accounts> {
        self.accounts.clone()
    }

    fn actions(&self) -> Arc<dyn actions::Actions> {
        self.actions.clone()
    }

    fn domains(&self) -> Arc<dyn domains::Domains> {
        self.domains.clone()
    }

    fn droplets(&self) -> Arc<dyn droplets::Droplets> {
        self.droplets.clone()
    }

    fn firewalls(&self) -> Arc<dyn firewalls::Firewalls> {
        self.firewalls.clone()
    }

    fn floating_ips(&self) -> Arc<dyn floating_ips::FloatingIps> {
        self.floating_ips.clone()
    }

    fn images(&self) -> Arc<dyn images::Images> {
        self.images.clone()
    }

    fn keys(&self) -> Arc<dyn keys::Keys> {
        self.keys.clone()
    }

    fn load_balancers(&self) -> Arc<dyn load_balancers::LoadBalancers> {
        self.load_balancers.clone()
    }

    fn regions(&self) -> Arc<dyn regions::Regions> {
        self.regions.clone()
    }

    fn sizes(&self) -> Arc<dyn sizes::Sizes> {
        self.sizes.clone()
    }

    fn snapshots(&self) -> Arc<dyn snapshots::Snapshots> {
        self.snapshots.clone()
    }

    fn tags(&self) -> Arc<dyn tags::Tags> {
        self.tags.clone()
    }

    fn volumes(&self) -> Arc<dyn volumes::Volumes> {
        self.volumes.clone()
    }
}

type Slot<F> = Mutex<Option<Box<F>>>;

// -- accounts ---------------------------------------------------------------

#[derive(Default)]
pub struct MockAccounts {
    inner: Mutex<Option<Arc<dyn accounts::Accounts>>>,
    get_fn: Slot<dyn Fn() -> Result<Account, ApiError> + Send + Sync>,
}

impl MockAccounts {
    pub fn on_get(&self, f: impl Fn() -> Result<Account, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl accounts::Accounts for MockAccounts {
    async fn get(&self) -> Result<Account, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f();
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get().await,
            None => Err(mock_gap("accounts.get")),
        }
    }
}

// -- actions ----------------------------------------------------------------

#[derive(Default)]
pub struct MockActions {
    inner: Mutex<Option<Arc<dyn actions::Actions>>>,
    get_fn: Slot<dyn Fn(i64) -> Result<Action, ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Action> + Send + Sync>,
}

impl MockActions {
    pub fn on_get(&self, f: impl Fn(i64) -> Result<Action, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Action> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl actions::Actions for MockActions {
    async fn get(&self, id: i64) -> Result<Action, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(id).await,
            None => Err(mock_gap("actions.get")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Action> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("actions.list")),
        }
    }
}

// -- domains ----------------------------------------------------------------

#[derive(Default)]
pub struct MockDomains {
    inner: Mutex<Option<Arc<dyn domains::Domains>>>,
    create_fn:
        Slot<dyn Fn(&str, &str, Vec<domains::CreateOpt>) -> Result<Domain, ApiError> + Send + Sync>,
    get_fn: Slot<dyn Fn(&str) -> Result<Domain, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Domain> + Send + Sync>,
    create_record_fn: Slot<
        dyn Fn(&str, Vec<domains::RecordOpt>) -> Result<DomainRecord, ApiError> + Send + Sync,
    >,
    get_record_fn: Slot<dyn Fn(&str, i64) -> Result<DomainRecord, ApiError> + Send + Sync>,
    update_record_fn: Slot<
        dyn Fn(&str, i64, Vec<domains::RecordOpt>) -> Result<DomainRecord, ApiError> + Send + Sync,
    >,
    delete_record_fn: Slot<dyn Fn(&str, i64) -> Result<(), ApiError> + Send + Sync>,
    list_records_fn:
        Slot<dyn Fn(CancellationToken, &str) -> ListPair<DomainRecord> + Send + Sync>,
}

impl MockDomains {
    pub fn on_create(
        &self,
        f: impl Fn(&str, &str, Vec<domains::CreateOpt>) -> Result<Domain, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get(&self, f: impl Fn(&str) -> Result<Domain, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Domain> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    pub fn on_create_record(
        &self,
        f: impl Fn(&str, Vec<domains::RecordOpt>) -> Result<DomainRecord, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_record_fn) = Some(Box::new(f));
    }

    pub fn on_get_record(
        &self,
        f: impl Fn(&str, i64) -> Result<DomainRecord, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_record_fn) = Some(Box::new(f));
    }

    pub fn on_update_record(
        &self,
        f: impl Fn(&str, i64, Vec<domains::RecordOpt>) -> Result<DomainRecord, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.update_record_fn) = Some(Box::new(f));
    }

    pub fn on_delete_record(
        &self,
        f: impl Fn(&str, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.delete_record_fn) = Some(Box::new(f));
    }

    pub fn on_list_records(
        &self,
        f: impl Fn(CancellationToken, &str) -> ListPair<DomainRecord> + Send + Sync + 'static,
    ) {
        *lock(&self.list_records_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl domains::Domains for MockDomains {
    async fn create(
        &self,
        name: &str,
        ip: &str,
        opts: Vec<domains::CreateOpt>,
    ) -> Result<Domain, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, ip, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, ip, opts).await,
            None => Err(mock_gap("domains.create")),
        }
    }

    async fn get(&self, name: &str) -> Result<Domain, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(name);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(name).await,
            None => Err(mock_gap("domains.get")),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(name);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(name).await,
            None => Err(mock_gap("domains.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Domain> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("domains.list")),
        }
    }

    async fn create_record(
        &self,
        domain: &str,
        opts: Vec<domains::RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        {
            let g = lock(&self.create_record_fn);
            if let Some(f) = g.as_ref() {
                return f(domain, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create_record(domain, opts).await,
            None => Err(mock_gap("domains.create_record")),
        }
    }

    async fn get_record(&self, domain: &str, id: i64) -> Result<DomainRecord, ApiError> {
        {
            let g = lock(&self.get_record_fn);
            if let Some(f) = g.as_ref() {
                return f(domain, id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_record(domain, id).await,
            None => Err(mock_gap("domains.get_record")),
        }
    }

    async fn update_record(
        &self,
        domain: &str,
        id: i64,
        opts: Vec<domains::RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        {
            let g = lock(&self.update_record_fn);
            if let Some(f) = g.as_ref() {
                return f(domain, id, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update_record(domain, id, opts).await,
            None => Err(mock_gap("domains.update_record")),
        }
    }

    async fn delete_record(&self, domain: &str, id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_record_fn);
            if let Some(f) = g.as_ref() {
                return f(domain, id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete_record(domain, id).await,
            None => Err(mock_gap("domains.delete_record")),
        }
    }

    fn list_records(&self, cancel: CancellationToken, domain: &str) -> ListPair<DomainRecord> {
        {
            let g = lock(&self.list_records_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel, domain);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_records(cancel, domain),
            None => channel_err(mock_gap("domains.list_records")),
        }
    }
}

// -- droplets ---------------------------------------------------------------

#[derive(Default)]
pub struct MockDroplets {
    inner: Mutex<Option<Arc<dyn droplets::Droplets>>>,
    pub actions: Arc<MockDropletActions>,
    create_fn: Slot<
        dyn Fn(&str, &str, &str, &str, Vec<droplets::CreateOpt>) -> Result<Droplet, ApiError>
            + Send
            + Sync,
    >,
    create_multiple_fn: Slot<
        dyn Fn(
                &[String],
                &str,
                &str,
                &str,
                Vec<droplets::CreateMultipleOpt>,
            ) -> Result<Vec<Droplet>, ApiError>
            + Send
            + Sync,
    >,
    get_fn: Slot<dyn Fn(i64) -> Result<Droplet, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(i64) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Droplet> + Send + Sync>,
}

impl MockDroplets {
    pub fn on_create(
        &self,
        f: impl Fn(&str, &str, &str, &str, Vec<droplets::CreateOpt>) -> Result<Droplet, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_create_multiple(
        &self,
        f: impl Fn(
                &[String],
                &str,
                &str,
                &str,
                Vec<droplets::CreateMultipleOpt>,
            ) -> Result<Vec<Droplet>, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_multiple_fn) = Some(Box::new(f));
    }

    pub fn on_get(&self, f: impl Fn(i64) -> Result<Droplet, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Droplet> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl droplets::Droplets for MockDroplets {
    async fn create(
        &self,
        name: &str,
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<droplets::CreateOpt>,
    ) -> Result<Droplet, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, region, size, image_slug, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, region, size, image_slug, opts).await,
            None => Err(mock_gap("droplets.create")),
        }
    }

    async fn create_multiple(
        &self,
        names: &[String],
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<droplets::CreateMultipleOpt>,
    ) -> Result<Vec<Droplet>, ApiError> {
        {
            let g = lock(&self.create_multiple_fn);
            if let Some(f) = g.as_ref() {
                return f(names, region, size, image_slug, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create_multiple(names, region, size, image_slug, opts).await,
            None => Err(mock_gap("droplets.create_multiple")),
        }
    }

    async fn get(&self, id: i64) -> Result<Droplet, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(id).await,
            None => Err(mock_gap("droplets.get")),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(id).await,
            None => Err(mock_gap("droplets.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Droplet> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("droplets.list")),
        }
    }

    fn actions(&self) -> Arc<dyn droplets::DropletActions> {
        self.actions.clone()
    }
}

type SimpleActionFn = dyn Fn(i64) -> Result<(), ApiError> + Send + Sync;

/// Droplet action slots. One shared `fallback` slot catches every action the
/// test does not care to distinguish; the per-action slots win when set.
#[derive(Default)]
pub struct MockDropletActions {
    fallback: Slot<dyn Fn(&str, i64) -> Result<(), ApiError> + Send + Sync>,
    shutdown_fn: Slot<SimpleActionFn>,
    power_off_fn: Slot<SimpleActionFn>,
    power_on_fn: Slot<SimpleActionFn>,
    power_cycle_fn: Slot<SimpleActionFn>,
    reboot_fn: Slot<SimpleActionFn>,
    restore_fn: Slot<dyn Fn(i64, i64) -> Result<(), ApiError> + Send + Sync>,
    resize_fn: Slot<dyn Fn(i64, &str, bool) -> Result<(), ApiError> + Send + Sync>,
    rename_fn: Slot<dyn Fn(i64, &str) -> Result<(), ApiError> + Send + Sync>,
    snapshot_fn: Slot<dyn Fn(i64, &str) -> Result<(), ApiError> + Send + Sync>,
    enable_backups_fn: Slot<SimpleActionFn>,
    disable_backups_fn: Slot<SimpleActionFn>,
    password_reset_fn: Slot<SimpleActionFn>,
    rebuild_by_id_fn: Slot<dyn Fn(i64, i64) -> Result<(), ApiError> + Send + Sync>,
    rebuild_by_slug_fn: Slot<dyn Fn(i64, &str) -> Result<(), ApiError> + Send + Sync>,
    change_kernel_fn: Slot<dyn Fn(i64, i64) -> Result<(), ApiError> + Send + Sync>,
    enable_ipv6_fn: Slot<SimpleActionFn>,
    enable_private_networking_fn: Slot<SimpleActionFn>,
    upgrade_fn: Slot<SimpleActionFn>,
}

impl MockDropletActions {
    /// Arm a catch-all slot. Receives the action kind and the droplet id.
    pub fn on_any(&self, f: impl Fn(&str, i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.fallback) = Some(Box::new(f));
    }

    pub fn on_shutdown(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.shutdown_fn) = Some(Box::new(f));
    }

    pub fn on_power_off(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.power_off_fn) = Some(Box::new(f));
    }

    pub fn on_power_on(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.power_on_fn) = Some(Box::new(f));
    }

    pub fn on_power_cycle(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.power_cycle_fn) = Some(Box::new(f));
    }

    pub fn on_reboot(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.reboot_fn) = Some(Box::new(f));
    }

    pub fn on_restore(
        &self,
        f: impl Fn(i64, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.restore_fn) = Some(Box::new(f));
    }

    pub fn on_resize(
        &self,
        f: impl Fn(i64, &str, bool) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.resize_fn) = Some(Box::new(f));
    }

    pub fn on_rename(
        &self,
        f: impl Fn(i64, &str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.rename_fn) = Some(Box::new(f));
    }

    pub fn on_snapshot(
        &self,
        f: impl Fn(i64, &str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.snapshot_fn) = Some(Box::new(f));
    }

    pub fn on_enable_backups(
        &self,
        f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.enable_backups_fn) = Some(Box::new(f));
    }

    pub fn on_disable_backups(
        &self,
        f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.disable_backups_fn) = Some(Box::new(f));
    }

    pub fn on_password_reset(
        &self,
        f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.password_reset_fn) = Some(Box::new(f));
    }

    pub fn on_rebuild_by_image_id(
        &self,
        f: impl Fn(i64, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.rebuild_by_id_fn) = Some(Box::new(f));
    }

    pub fn on_rebuild_by_image_slug(
        &self,
        f: impl Fn(i64, &str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.rebuild_by_slug_fn) = Some(Box::new(f));
    }

    pub fn on_change_kernel(
        &self,
        f: impl Fn(i64, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.change_kernel_fn) = Some(Box::new(f));
    }

    pub fn on_enable_ipv6(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.enable_ipv6_fn) = Some(Box::new(f));
    }

    pub fn on_enable_private_networking(
        &self,
        f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.enable_private_networking_fn) = Some(Box::new(f));
    }

    pub fn on_upgrade(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.upgrade_fn) = Some(Box::new(f));
    }

    fn simple(
        &self,
        kind: &str,
        slot: &Slot<SimpleActionFn>,
        droplet_id: i64,
    ) -> Result<(), ApiError> {
        {
            let g = lock(slot);
            if let Some(f) = g.as_ref() {
                return f(droplet_id);
            }
        }
        self.any(kind, droplet_id)
    }

    fn any(&self, kind: &str, droplet_id: i64) -> Result<(), ApiError> {
        let g = lock(&self.fallback);
        match g.as_ref() {
            Some(f) => f(kind, droplet_id),
            None => Err(mock_gap(&format!("droplets.{kind}"))),
        }
    }
}

#[async_trait]
impl droplets::DropletActions for MockDropletActions {
    async fn shutdown(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("shutdown", &self.shutdown_fn, droplet_id)
    }

    async fn power_off(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("power_off", &self.power_off_fn, droplet_id)
    }

    async fn power_on(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("power_on", &self.power_on_fn, droplet_id)
    }

    async fn power_cycle(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("power_cycle", &self.power_cycle_fn, droplet_id)
    }

    async fn reboot(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("reboot", &self.reboot_fn, droplet_id)
    }

    async fn restore(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.restore_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, image_id);
            }
        }
        self.any("restore", droplet_id)
    }

    async fn resize(
        &self,
        droplet_id: i64,
        size_slug: &str,
        resize_disk: bool,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.resize_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, size_slug, resize_disk);
            }
        }
        self.any("resize", droplet_id)
    }

    async fn rename(&self, droplet_id: i64, name: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.rename_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, name);
            }
        }
        self.any("rename", droplet_id)
    }

    async fn snapshot(&self, droplet_id: i64, name: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.snapshot_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, name);
            }
        }
        self.any("snapshot", droplet_id)
    }

    async fn enable_backups(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("enable_backups", &self.enable_backups_fn, droplet_id)
    }

    async fn disable_backups(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("disable_backups", &self.disable_backups_fn, droplet_id)
    }

    async fn password_reset(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("password_reset", &self.password_reset_fn, droplet_id)
    }

    async fn rebuild_by_image_id(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.rebuild_by_id_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, image_id);
            }
        }
        self.any("rebuild", droplet_id)
    }

    async fn rebuild_by_image_slug(
        &self,
        droplet_id: i64,
        image_slug: &str,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.rebuild_by_slug_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, image_slug);
            }
        }
        self.any("rebuild", droplet_id)
    }

    async fn change_kernel(&self, droplet_id: i64, kernel_id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.change_kernel_fn);
            if let Some(f) = g.as_ref() {
                return f(droplet_id, kernel_id);
            }
        }
        self.any("change_kernel", droplet_id)
    }

    async fn enable_ipv6(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("enable_ipv6", &self.enable_ipv6_fn, droplet_id)
    }

    async fn enable_private_networking(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple(
            "enable_private_networking",
            &self.enable_private_networking_fn,
            droplet_id,
        )
    }

    async fn upgrade(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.simple("upgrade", &self.upgrade_fn, droplet_id)
    }
}

// -- firewalls --------------------------------------------------------------

#[derive(Default)]
pub struct MockFirewalls {
    inner: Mutex<Option<Arc<dyn firewalls::Firewalls>>>,
    create_fn: Slot<
        dyn Fn(
                &str,
                Vec<InboundRule>,
                Vec<OutboundRule>,
                Vec<firewalls::CreateOpt>,
            ) -> Result<Firewall, ApiError>
            + Send
            + Sync,
    >,
    get_fn: Slot<dyn Fn(&str) -> Result<Firewall, ApiError> + Send + Sync>,
    update_fn:
        Slot<dyn Fn(&str, Vec<firewalls::CreateOpt>) -> Result<Firewall, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Firewall> + Send + Sync>,
    droplets_fn: Slot<dyn Fn(&str, &str, Vec<i64>) -> Result<(), ApiError> + Send + Sync>,
    tags_fn: Slot<dyn Fn(&str, &str, Vec<String>) -> Result<(), ApiError> + Send + Sync>,
    rules_fn: Slot<
        dyn Fn(&str, &str, Vec<InboundRule>, Vec<OutboundRule>) -> Result<(), ApiError>
            + Send
            + Sync,
    >,
}

impl MockFirewalls {
    pub fn on_create(
        &self,
        f: impl Fn(
                &str,
                Vec<InboundRule>,
                Vec<OutboundRule>,
                Vec<firewalls::CreateOpt>,
            ) -> Result<Firewall, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get(&self, f: impl Fn(&str) -> Result<Firewall, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_update(
        &self,
        f: impl Fn(&str, Vec<firewalls::CreateOpt>) -> Result<Firewall, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.update_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Firewall> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    /// Receives "add" or "remove", the firewall id, and the droplet ids.
    pub fn on_droplets(
        &self,
        f: impl Fn(&str, &str, Vec<i64>) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.droplets_fn) = Some(Box::new(f));
    }

    /// Receives "add" or "remove", the firewall id, and the tag names.
    pub fn on_tags(
        &self,
        f: impl Fn(&str, &str, Vec<String>) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.tags_fn) = Some(Box::new(f));
    }

    /// Receives "add" or "remove", the firewall id, and both rule lists.
    pub fn on_rules(
        &self,
        f: impl Fn(&str, &str, Vec<InboundRule>, Vec<OutboundRule>) -> Result<(), ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.rules_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl firewalls::Firewalls for MockFirewalls {
    async fn create(
        &self,
        name: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
        opts: Vec<firewalls::CreateOpt>,
    ) -> Result<Firewall, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, inbound_rules, outbound_rules, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, inbound_rules, outbound_rules, opts).await,
            None => Err(mock_gap("firewalls.create")),
        }
    }

    async fn get(&self, id: &str) -> Result<Firewall, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(id).await,
            None => Err(mock_gap("firewalls.get")),
        }
    }

    async fn update(
        &self,
        id: &str,
        opts: Vec<firewalls::CreateOpt>,
    ) -> Result<Firewall, ApiError> {
        {
            let g = lock(&self.update_fn);
            if let Some(f) = g.as_ref() {
                return f(id, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update(id, opts).await,
            None => Err(mock_gap("firewalls.update")),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(id).await,
            None => Err(mock_gap("firewalls.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Firewall> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("firewalls.list")),
        }
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        {
            let g = lock(&self.droplets_fn);
            if let Some(f) = g.as_ref() {
                return f("add", id, droplet_ids);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.add_droplets(id, droplet_ids).await,
            None => Err(mock_gap("firewalls.add_droplets")),
        }
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        {
            let g = lock(&self.droplets_fn);
            if let Some(f) = g.as_ref() {
                return f("remove", id, droplet_ids);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.remove_droplets(id, droplet_ids).await,
            None => Err(mock_gap("firewalls.remove_droplets")),
        }
    }

    async fn add_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        {
            let g = lock(&self.tags_fn);
            if let Some(f) = g.as_ref() {
                return f("add", id, tags);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.add_tags(id, tags).await,
            None => Err(mock_gap("firewalls.add_tags")),
        }
    }

    async fn remove_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        {
            let g = lock(&self.tags_fn);
            if let Some(f) = g.as_ref() {
                return f("remove", id, tags);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.remove_tags(id, tags).await,
            None => Err(mock_gap("firewalls.remove_tags")),
        }
    }

    async fn add_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.rules_fn);
            if let Some(f) = g.as_ref() {
                return f("add", id, inbound_rules, outbound_rules);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.add_rules(id, inbound_rules, outbound_rules).await,
            None => Err(mock_gap("firewalls.add_rules")),
        }
    }

    async fn remove_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.rules_fn);
            if let Some(f) = g.as_ref() {
                return f("remove", id, inbound_rules, outbound_rules);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.remove_rules(id, inbound_rules, outbound_rules).await,
            None => Err(mock_gap("firewalls.remove_rules")),
        }
    }
}

// -- floating IPs -----------------------------------------------------------

#[derive(Default)]
pub struct MockFloatingIps {
    inner: Mutex<Option<Arc<dyn floating_ips::FloatingIps>>>,
    pub actions: Arc<MockFloatingIpActions>,
    create_fn:
        Slot<dyn Fn(Vec<floating_ips::CreateOpt>) -> Result<FloatingIp, ApiError> + Send + Sync>,
    get_fn: Slot<dyn Fn(&str) -> Result<FloatingIp, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<FloatingIp> + Send + Sync>,
}

impl MockFloatingIps {
    pub fn on_create(
        &self,
        f: impl Fn(Vec<floating_ips::CreateOpt>) -> Result<FloatingIp, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get(
        &self,
        f: impl Fn(&str) -> Result<FloatingIp, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<FloatingIp> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl floating_ips::FloatingIps for MockFloatingIps {
    async fn create(&self, opts: Vec<floating_ips::CreateOpt>) -> Result<FloatingIp, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(opts).await,
            None => Err(mock_gap("floating_ips.create")),
        }
    }

    async fn get(&self, ip: &str) -> Result<FloatingIp, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(ip);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(ip).await,
            None => Err(mock_gap("floating_ips.get")),
        }
    }

    async fn delete(&self, ip: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(ip);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(ip).await,
            None => Err(mock_gap("floating_ips.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<FloatingIp> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("floating_ips.list")),
        }
    }

    fn actions(&self) -> Arc<dyn floating_ips::FloatingIpActions> {
        self.actions.clone()
    }
}

#[derive(Default)]
pub struct MockFloatingIpActions {
    assign_fn: Slot<dyn Fn(&str, i64) -> Result<(), ApiError> + Send + Sync>,
    unassign_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
}

impl MockFloatingIpActions {
    pub fn on_assign(
        &self,
        f: impl Fn(&str, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.assign_fn) = Some(Box::new(f));
    }

    pub fn on_unassign(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.unassign_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl floating_ips::FloatingIpActions for MockFloatingIpActions {
    async fn assign(&self, ip: &str, droplet_id: i64) -> Result<(), ApiError> {
        let g = lock(&self.assign_fn);
        match g.as_ref() {
            Some(f) => f(ip, droplet_id),
            None => Err(mock_gap("floating_ips.assign")),
        }
    }

    async fn unassign(&self, ip: &str) -> Result<(), ApiError> {
        let g = lock(&self.unassign_fn);
        match g.as_ref() {
            Some(f) => f(ip),
            None => Err(mock_gap("floating_ips.unassign")),
        }
    }
}

// -- images -----------------------------------------------------------------

#[derive(Default)]
pub struct MockImages {
    inner: Mutex<Option<Arc<dyn images::Images>>>,
    get_by_id_fn: Slot<dyn Fn(i64) -> Result<Image, ApiError> + Send + Sync>,
    get_by_slug_fn: Slot<dyn Fn(&str) -> Result<Image, ApiError> + Send + Sync>,
    update_fn: Slot<dyn Fn(i64, Vec<images::UpdateOpt>) -> Result<Image, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(i64) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken, &str) -> ListPair<Image> + Send + Sync>,
}

impl MockImages {
    pub fn on_get_by_id(&self, f: impl Fn(i64) -> Result<Image, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_by_id_fn) = Some(Box::new(f));
    }

    pub fn on_get_by_slug(
        &self,
        f: impl Fn(&str) -> Result<Image, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_by_slug_fn) = Some(Box::new(f));
    }

    pub fn on_update(
        &self,
        f: impl Fn(i64, Vec<images::UpdateOpt>) -> Result<Image, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.update_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    /// Receives the cancellation token and the listing kind: "", "distribution",
    /// "application" or "user".
    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken, &str) -> ListPair<Image> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    fn list_kind(&self, cancel: CancellationToken, kind: &str) -> Option<ListPair<Image>> {
        let g = lock(&self.list_fn);
        g.as_ref().map(|f| f(cancel, kind))
    }
}

#[async_trait]
impl images::Images for MockImages {
    async fn get_by_id(&self, id: i64) -> Result<Image, ApiError> {
        {
            let g = lock(&self.get_by_id_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_by_id(id).await,
            None => Err(mock_gap("images.get")),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Image, ApiError> {
        {
            let g = lock(&self.get_by_slug_fn);
            if let Some(f) = g.as_ref() {
                return f(slug);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_by_slug(slug).await,
            None => Err(mock_gap("images.get")),
        }
    }

    async fn update(&self, id: i64, opts: Vec<images::UpdateOpt>) -> Result<Image, ApiError> {
        {
            let g = lock(&self.update_fn);
            if let Some(f) = g.as_ref() {
                return f(id, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update(id, opts).await,
            None => Err(mock_gap("images.update")),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(id).await,
            None => Err(mock_gap("images.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Image> {
        if let Some(pair) = self.list_kind(cancel.clone(), "") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("images.list")),
        }
    }

    fn list_distribution(&self, cancel: CancellationToken) -> ListPair<Image> {
        if let Some(pair) = self.list_kind(cancel.clone(), "distribution") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_distribution(cancel),
            None => channel_err(mock_gap("images.list_distribution")),
        }
    }

    fn list_application(&self, cancel: CancellationToken) -> ListPair<Image> {
        if let Some(pair) = self.list_kind(cancel.clone(), "application") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_application(cancel),
            None => channel_err(mock_gap("images.list_application")),
        }
    }

    fn list_user(&self, cancel: CancellationToken) -> ListPair<Image> {
        if let Some(pair) = self.list_kind(cancel.clone(), "user") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_user(cancel),
            None => channel_err(mock_gap("images.list_user")),
        }
    }
}

// -- keys -------------------------------------------------------------------

#[derive(Default)]
pub struct MockKeys {
    inner: Mutex<Option<Arc<dyn keys::Keys>>>,
    create_fn:
        Slot<dyn Fn(&str, &str, Vec<keys::CreateOpt>) -> Result<Key, ApiError> + Send + Sync>,
    get_by_id_fn: Slot<dyn Fn(i64) -> Result<Key, ApiError> + Send + Sync>,
    get_by_fingerprint_fn: Slot<dyn Fn(&str) -> Result<Key, ApiError> + Send + Sync>,
    update_by_id_fn:
        Slot<dyn Fn(i64, Vec<keys::UpdateOpt>) -> Result<Key, ApiError> + Send + Sync>,
    update_by_fingerprint_fn:
        Slot<dyn Fn(&str, Vec<keys::UpdateOpt>) -> Result<Key, ApiError> + Send + Sync>,
    delete_by_id_fn: Slot<dyn Fn(i64) -> Result<(), ApiError> + Send + Sync>,
    delete_by_fingerprint_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Key> + Send + Sync>,
}

impl MockKeys {
    pub fn on_create(
        &self,
        f: impl Fn(&str, &str, Vec<keys::CreateOpt>) -> Result<Key, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get_by_id(&self, f: impl Fn(i64) -> Result<Key, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_by_id_fn) = Some(Box::new(f));
    }

    pub fn on_get_by_fingerprint(
        &self,
        f: impl Fn(&str) -> Result<Key, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_by_fingerprint_fn) = Some(Box::new(f));
    }

    pub fn on_update_by_id(
        &self,
        f: impl Fn(i64, Vec<keys::UpdateOpt>) -> Result<Key, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.update_by_id_fn) = Some(Box::new(f));
    }

    pub fn on_update_by_fingerprint(
        &self,
        f: impl Fn(&str, Vec<keys::UpdateOpt>) -> Result<Key, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.update_by_fingerprint_fn) = Some(Box::new(f));
    }

    pub fn on_delete_by_id(
        &self,
        f: impl Fn(i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.delete_by_id_fn) = Some(Box::new(f));
    }

    pub fn on_delete_by_fingerprint(
        &self,
        f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.delete_by_fingerprint_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Key> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl keys::Keys for MockKeys {
    async fn create(
        &self,
        name: &str,
        public_key: &str,
        opts: Vec<keys::CreateOpt>,
    ) -> Result<Key, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, public_key, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, public_key, opts).await,
            None => Err(mock_gap("keys.create")),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Key, ApiError> {
        {
            let g = lock(&self.get_by_id_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_by_id(id).await,
            None => Err(mock_gap("keys.get")),
        }
    }

    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Key, ApiError> {
        {
            let g = lock(&self.get_by_fingerprint_fn);
            if let Some(f) = g.as_ref() {
                return f(fingerprint);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_by_fingerprint(fingerprint).await,
            None => Err(mock_gap("keys.get")),
        }
    }

    async fn update_by_id(&self, id: i64, opts: Vec<keys::UpdateOpt>) -> Result<Key, ApiError> {
        {
            let g = lock(&self.update_by_id_fn);
            if let Some(f) = g.as_ref() {
                return f(id, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update_by_id(id, opts).await,
            None => Err(mock_gap("keys.update")),
        }
    }

    async fn update_by_fingerprint(
        &self,
        fingerprint: &str,
        opts: Vec<keys::UpdateOpt>,
    ) -> Result<Key, ApiError> {
        {
            let g = lock(&self.update_by_fingerprint_fn);
            if let Some(f) = g.as_ref() {
                return f(fingerprint, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update_by_fingerprint(fingerprint, opts).await,
            None => Err(mock_gap("keys.update")),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_by_id_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete_by_id(id).await,
            None => Err(mock_gap("keys.delete")),
        }
    }

    async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_by_fingerprint_fn);
            if let Some(f) = g.as_ref() {
                return f(fingerprint);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete_by_fingerprint(fingerprint).await,
            None => Err(mock_gap("keys.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Key> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("keys.list")),
        }
    }
}

// -- load balancers ---------------------------------------------------------

#[derive(Default)]
pub struct MockLoadBalancers {
    inner: Mutex<Option<Arc<dyn load_balancers::LoadBalancers>>>,
    create_fn: Slot<
        dyn Fn(
                &str,
                &str,
                Vec<ForwardingRule>,
                Vec<load_balancers::CreateOpt>,
            ) -> Result<LoadBalancer, ApiError>
            + Send
            + Sync,
    >,
    get_fn: Slot<dyn Fn(&str) -> Result<LoadBalancer, ApiError> + Send + Sync>,
    update_fn: Slot<
        dyn Fn(&str, Vec<load_balancers::CreateOpt>) -> Result<LoadBalancer, ApiError>
            + Send
            + Sync,
    >,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<LoadBalancer> + Send + Sync>,
    droplets_fn: Slot<dyn Fn(&str, &str, Vec<i64>) -> Result<(), ApiError> + Send + Sync>,
    forwarding_rules_fn:
        Slot<dyn Fn(&str, &str, Vec<ForwardingRule>) -> Result<(), ApiError> + Send + Sync>,
}

impl MockLoadBalancers {
    pub fn on_create(
        &self,
        f: impl Fn(
                &str,
                &str,
                Vec<ForwardingRule>,
                Vec<load_balancers::CreateOpt>,
            ) -> Result<LoadBalancer, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get(
        &self,
        f: impl Fn(&str) -> Result<LoadBalancer, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_update(
        &self,
        f: impl Fn(&str, Vec<load_balancers::CreateOpt>) -> Result<LoadBalancer, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.update_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<LoadBalancer> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    /// Receives "add" or "remove", the balancer id, and the droplet ids.
    pub fn on_droplets(
        &self,
        f: impl Fn(&str, &str, Vec<i64>) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.droplets_fn) = Some(Box::new(f));
    }

    /// Receives "add" or "remove", the balancer id, and the rules.
    pub fn on_forwarding_rules(
        &self,
        f: impl Fn(&str, &str, Vec<ForwardingRule>) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.forwarding_rules_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl load_balancers::LoadBalancers for MockLoadBalancers {
    async fn create(
        &self,
        name: &str,
        region: &str,
        forwarding_rules: Vec<ForwardingRule>,
        opts: Vec<load_balancers::CreateOpt>,
    ) -> Result<LoadBalancer, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, region, forwarding_rules, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, region, forwarding_rules, opts).await,
            None => Err(mock_gap("load_balancers.create")),
        }
    }

    async fn get(&self, id: &str) -> Result<LoadBalancer, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(id).await,
            None => Err(mock_gap("load_balancers.get")),
        }
    }

    async fn update(
        &self,
        id: &str,
        opts: Vec<load_balancers::CreateOpt>,
    ) -> Result<LoadBalancer, ApiError> {
        {
            let g = lock(&self.update_fn);
            if let Some(f) = g.as_ref() {
                return f(id, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.update(id, opts).await,
            None => Err(mock_gap("load_balancers.update")),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(id).await,
            None => Err(mock_gap("load_balancers.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<LoadBalancer> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("load_balancers.list")),
        }
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        {
            let g = lock(&self.droplets_fn);
            if let Some(f) = g.as_ref() {
                return f("add", id, droplet_ids);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.add_droplets(id, droplet_ids).await,
            None => Err(mock_gap("load_balancers.add_droplets")),
        }
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        {
            let g = lock(&self.droplets_fn);
            if let Some(f) = g.as_ref() {
                return f("remove", id, droplet_ids);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.remove_droplets(id, droplet_ids).await,
            None => Err(mock_gap("load_balancers.remove_droplets")),
        }
    }

    async fn add_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.forwarding_rules_fn);
            if let Some(f) = g.as_ref() {
                return f("add", id, rules);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.add_forwarding_rules(id, rules).await,
            None => Err(mock_gap("load_balancers.add_forwarding_rules")),
        }
    }

    async fn remove_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.forwarding_rules_fn);
            if let Some(f) = g.as_ref() {
                return f("remove", id, rules);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.remove_forwarding_rules(id, rules).await,
            None => Err(mock_gap("load_balancers.remove_forwarding_rules")),
        }
    }
}

// -- regions / sizes --------------------------------------------------------

#[derive(Default)]
pub struct MockRegions {
    inner: Mutex<Option<Arc<dyn regions::Regions>>>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Region> + Send + Sync>,
}

impl MockRegions {
    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Region> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

impl regions::Regions for MockRegions {
    fn list(&self, cancel: CancellationToken) -> ListPair<Region> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("regions.list")),
        }
    }
}

#[derive(Default)]
pub struct MockSizes {
    inner: Mutex<Option<Arc<dyn sizes::Sizes>>>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Size> + Send + Sync>,
}

impl MockSizes {
    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Size> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }
}

impl sizes::Sizes for MockSizes {
    fn list(&self, cancel: CancellationToken) -> ListPair<Size> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("sizes.list")),
        }
    }
}

// -- snapshots --------------------------------------------------------------

#[derive(Default)]
pub struct MockSnapshots {
    inner: Mutex<Option<Arc<dyn snapshots::Snapshots>>>,
    get_fn: Slot<dyn Fn(&str) -> Result<Snapshot, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken, &str) -> ListPair<Snapshot> + Send + Sync>,
}

impl MockSnapshots {
    pub fn on_get(&self, f: impl Fn(&str) -> Result<Snapshot, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    /// Receives the cancellation token and the resource type filter: "",
    /// "droplet" or "volume".
    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken, &str) -> ListPair<Snapshot> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    fn list_kind(&self, cancel: CancellationToken, kind: &str) -> Option<ListPair<Snapshot>> {
        let g = lock(&self.list_fn);
        g.as_ref().map(|f| f(cancel, kind))
    }
}

#[async_trait]
impl snapshots::Snapshots for MockSnapshots {
    async fn get(&self, id: &str) -> Result<Snapshot, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(id).await,
            None => Err(mock_gap("snapshots.get")),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(id).await,
            None => Err(mock_gap("snapshots.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Snapshot> {
        if let Some(pair) = self.list_kind(cancel.clone(), "") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("snapshots.list")),
        }
    }

    fn list_droplet(&self, cancel: CancellationToken) -> ListPair<Snapshot> {
        if let Some(pair) = self.list_kind(cancel.clone(), "droplet") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_droplet(cancel),
            None => channel_err(mock_gap("snapshots.list_droplet")),
        }
    }

    fn list_volume(&self, cancel: CancellationToken) -> ListPair<Snapshot> {
        if let Some(pair) = self.list_kind(cancel.clone(), "volume") {
            return pair;
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_volume(cancel),
            None => channel_err(mock_gap("snapshots.list_volume")),
        }
    }
}

// -- tags -------------------------------------------------------------------

#[derive(Default)]
pub struct MockTags {
    inner: Mutex<Option<Arc<dyn tags::Tags>>>,
    create_fn: Slot<dyn Fn(&str, Vec<tags::CreateOpt>) -> Result<Tag, ApiError> + Send + Sync>,
    get_fn: Slot<dyn Fn(&str) -> Result<Tag, ApiError> + Send + Sync>,
    delete_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Tag> + Send + Sync>,
    resources_fn: Slot<dyn Fn(&str, &str, Vec<TagResource>) -> Result<(), ApiError> + Send + Sync>,
}

impl MockTags {
    pub fn on_create(
        &self,
        f: impl Fn(&str, Vec<tags::CreateOpt>) -> Result<Tag, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.create_fn) = Some(Box::new(f));
    }

    pub fn on_get(&self, f: impl Fn(&str) -> Result<Tag, ApiError> + Send + Sync + 'static) {
        *lock(&self.get_fn) = Some(Box::new(f));
    }

    pub fn on_delete(&self, f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static) {
        *lock(&self.delete_fn) = Some(Box::new(f));
    }

    pub fn on_list(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Tag> + Send + Sync + 'static,
    ) {
        *lock(&self.list_fn) = Some(Box::new(f));
    }

    /// Receives "tag" or "untag", the tag name, and the resources.
    pub fn on_resources(
        &self,
        f: impl Fn(&str, &str, Vec<TagResource>) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.resources_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl tags::Tags for MockTags {
    async fn create(&self, name: &str, opts: Vec<tags::CreateOpt>) -> Result<Tag, ApiError> {
        {
            let g = lock(&self.create_fn);
            if let Some(f) = g.as_ref() {
                return f(name, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create(name, opts).await,
            None => Err(mock_gap("tags.create")),
        }
    }

    async fn get(&self, name: &str) -> Result<Tag, ApiError> {
        {
            let g = lock(&self.get_fn);
            if let Some(f) = g.as_ref() {
                return f(name);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get(name).await,
            None => Err(mock_gap("tags.get")),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_fn);
            if let Some(f) = g.as_ref() {
                return f(name);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete(name).await,
            None => Err(mock_gap("tags.delete")),
        }
    }

    fn list(&self, cancel: CancellationToken) -> ListPair<Tag> {
        {
            let g = lock(&self.list_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list(cancel),
            None => channel_err(mock_gap("tags.list")),
        }
    }

    async fn tag_resources(
        &self,
        name: &str,
        resources: Vec<TagResource>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.resources_fn);
            if let Some(f) = g.as_ref() {
                return f("tag", name, resources);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.tag_resources(name, resources).await,
            None => Err(mock_gap("tags.tag_resources")),
        }
    }

    async fn untag_resources(
        &self,
        name: &str,
        resources: Vec<TagResource>,
    ) -> Result<(), ApiError> {
        {
            let g = lock(&self.resources_fn);
            if let Some(f) = g.as_ref() {
                return f("untag", name, resources);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.untag_resources(name, resources).await,
            None => Err(mock_gap("tags.untag_resources")),
        }
    }
}

// -- volumes ----------------------------------------------------------------

#[derive(Default)]
pub struct MockVolumes {
    inner: Mutex<Option<Arc<dyn volumes::Volumes>>>,
    pub actions: Arc<MockVolumeActions>,
    create_volume_fn: Slot<
        dyn Fn(&str, &str, i64, Vec<volumes::CreateOpt>) -> Result<Volume, ApiError> + Send + Sync,
    >,
    get_volume_fn: Slot<dyn Fn(&str) -> Result<Volume, ApiError> + Send + Sync>,
    delete_volume_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_volumes_fn: Slot<dyn Fn(CancellationToken) -> ListPair<Volume> + Send + Sync>,
    create_snapshot_fn: Slot<
        dyn Fn(&str, &str, Vec<volumes::SnapshotOpt>) -> Result<Snapshot, ApiError> + Send + Sync,
    >,
    get_snapshot_fn: Slot<dyn Fn(&str) -> Result<Snapshot, ApiError> + Send + Sync>,
    delete_snapshot_fn: Slot<dyn Fn(&str) -> Result<(), ApiError> + Send + Sync>,
    list_snapshots_fn:
        Slot<dyn Fn(CancellationToken, &str) -> ListPair<Snapshot> + Send + Sync>,
}

impl MockVolumes {
    pub fn on_create_volume(
        &self,
        f: impl Fn(&str, &str, i64, Vec<volumes::CreateOpt>) -> Result<Volume, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_volume_fn) = Some(Box::new(f));
    }

    pub fn on_get_volume(
        &self,
        f: impl Fn(&str) -> Result<Volume, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_volume_fn) = Some(Box::new(f));
    }

    pub fn on_delete_volume(
        &self,
        f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.delete_volume_fn) = Some(Box::new(f));
    }

    pub fn on_list_volumes(
        &self,
        f: impl Fn(CancellationToken) -> ListPair<Volume> + Send + Sync + 'static,
    ) {
        *lock(&self.list_volumes_fn) = Some(Box::new(f));
    }

    pub fn on_create_snapshot(
        &self,
        f: impl Fn(&str, &str, Vec<volumes::SnapshotOpt>) -> Result<Snapshot, ApiError>
            + Send
            + Sync
            + 'static,
    ) {
        *lock(&self.create_snapshot_fn) = Some(Box::new(f));
    }

    pub fn on_get_snapshot(
        &self,
        f: impl Fn(&str) -> Result<Snapshot, ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.get_snapshot_fn) = Some(Box::new(f));
    }

    pub fn on_delete_snapshot(
        &self,
        f: impl Fn(&str) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.delete_snapshot_fn) = Some(Box::new(f));
    }

    pub fn on_list_snapshots(
        &self,
        f: impl Fn(CancellationToken, &str) -> ListPair<Snapshot> + Send + Sync + 'static,
    ) {
        *lock(&self.list_snapshots_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl volumes::Volumes for MockVolumes {
    async fn create_volume(
        &self,
        name: &str,
        region: &str,
        size_gigabytes: i64,
        opts: Vec<volumes::CreateOpt>,
    ) -> Result<Volume, ApiError> {
        {
            let g = lock(&self.create_volume_fn);
            if let Some(f) = g.as_ref() {
                return f(name, region, size_gigabytes, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create_volume(name, region, size_gigabytes, opts).await,
            None => Err(mock_gap("volumes.create_volume")),
        }
    }

    async fn get_volume(&self, id: &str) -> Result<Volume, ApiError> {
        {
            let g = lock(&self.get_volume_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_volume(id).await,
            None => Err(mock_gap("volumes.get_volume")),
        }
    }

    async fn delete_volume(&self, id: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_volume_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete_volume(id).await,
            None => Err(mock_gap("volumes.delete_volume")),
        }
    }

    fn list_volumes(&self, cancel: CancellationToken) -> ListPair<Volume> {
        {
            let g = lock(&self.list_volumes_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_volumes(cancel),
            None => channel_err(mock_gap("volumes.list_volumes")),
        }
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
        opts: Vec<volumes::SnapshotOpt>,
    ) -> Result<Snapshot, ApiError> {
        {
            let g = lock(&self.create_snapshot_fn);
            if let Some(f) = g.as_ref() {
                return f(volume_id, name, opts);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.create_snapshot(volume_id, name, opts).await,
            None => Err(mock_gap("volumes.create_snapshot")),
        }
    }

    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError> {
        {
            let g = lock(&self.get_snapshot_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.get_snapshot(id).await,
            None => Err(mock_gap("volumes.get_snapshot")),
        }
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError> {
        {
            let g = lock(&self.delete_snapshot_fn);
            if let Some(f) = g.as_ref() {
                return f(id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.delete_snapshot(id).await,
            None => Err(mock_gap("volumes.delete_snapshot")),
        }
    }

    fn list_snapshots(&self, cancel: CancellationToken, volume_id: &str) -> ListPair<Snapshot> {
        {
            let g = lock(&self.list_snapshots_fn);
            if let Some(f) = g.as_ref() {
                return f(cancel, volume_id);
            }
        }
        let inner = lock(&self.inner).clone();
        match inner {
            Some(c) => c.list_snapshots(cancel, volume_id),
            None => channel_err(mock_gap("volumes.list_snapshots")),
        }
    }

    fn actions(&self) -> Arc<dyn volumes::VolumeActions> {
        self.actions.clone()
    }
}

#[derive(Default)]
pub struct MockVolumeActions {
    attach_fn: Slot<dyn Fn(&str, i64) -> Result<(), ApiError> + Send + Sync>,
    detach_fn: Slot<dyn Fn(&str, i64) -> Result<(), ApiError> + Send + Sync>,
}

impl MockVolumeActions {
    pub fn on_attach(
        &self,
        f: impl Fn(&str, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.attach_fn) = Some(Box::new(f));
    }

    pub fn on_detach(
        &self,
        f: impl Fn(&str, i64) -> Result<(), ApiError> + Send + Sync + 'static,
    ) {
        *lock(&self.detach_fn) = Some(Box::new(f));
    }
}

#[async_trait]
impl volumes::VolumeActions for MockVolumeActions {
    async fn attach(&self, volume_id: &str, droplet_id: i64) -> Result<(), ApiError> {
        let g = lock(&self.attach_fn);
        match g.as_ref() {
            Some(f) => f(volume_id, droplet_id),
            None => Err(mock_gap("volumes.attach")),
        }
    }

    async fn detach_by_droplet_id(
        &self,
        volume_id: &str,
        droplet_id: i64,
    ) -> Result<(), ApiError> {
        let g = lock(&self.detach_fn);
        match g.as_ref() {
            Some(f) => f(volume_id, droplet_id),
            None => Err(mock_gap("volumes.detach")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::Cloud;

    #[tokio::test]
    async fn unarmed_slot_fails_loudly() {
        let mock = MockCloud::new();
        let err = mock.droplets().get(1).await.unwrap_err();
        assert!(err.to_string().contains("droplets.get"));
    }

    #[tokio::test]
    async fn armed_slot_wins() {
        let mock = MockCloud::new();
        mock.droplets.on_delete(|id| {
            assert_eq!(id, 42);
            Ok(())
        });
        mock.droplets().delete(42).await.unwrap();
    }

    #[tokio::test]
    async fn preloaded_list_channel_drains_in_order() {
        let (mut items, _errs) = channel_of(vec![1, 2, 3]);
        assert_eq!(items.recv().await, Some(1));
        assert_eq!(items.recv().await, Some(2));
        assert_eq!(items.recv().await, Some(3));
        assert_eq!(items.recv().await, None);
    }
}
