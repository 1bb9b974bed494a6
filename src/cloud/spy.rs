//! A recording wrapper around a [`Cloud`]. Successful creations are noted,
//! successful deletions forgotten, so whatever remains when a session ends is
//! a resource the user is still paying for.

use super::{
    accounts, actions, domains, droplets, firewalls, floating_ips, images, keys, load_balancers,
    regions, sizes, snapshots, tags, volumes, Cloud,
};
use crate::api::types::{
    Domain, DomainRecord, Droplet, Firewall, FloatingIp, ForwardingRule, InboundRule, Key,
    LoadBalancer, OutboundRule, Snapshot, Tag, Volume,
};
use crate::api::ApiError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct SpyState {
    droplets: HashMap<i64, Droplet>,
    volumes: HashMap<String, Volume>,
    snapshots: HashMap<String, Snapshot>,
    domains: HashMap<String, Domain>,
    records: HashMap<(String, i64), DomainRecord>,
    floating_ips: HashMap<String, FloatingIp>,
    keys: HashMap<i64, Key>,
    tags: HashMap<String, Tag>,
    load_balancers: HashMap<String, LoadBalancer>,
    firewalls: HashMap<String, Firewall>,
}

pub struct SpyCloud {
    inner: Arc<dyn Cloud>,
    state: Arc<Mutex<SpyState>>,
    droplets: Arc<SpyDroplets>,
    domains: Arc<SpyDomains>,
    floating_ips: Arc<SpyFloatingIps>,
    volumes: Arc<SpyVolumes>,
    snapshots: Arc<SpySnapshots>,
    keys: Arc<SpyKeys>,
    tags: Arc<SpyTags>,
    load_balancers: Arc<SpyLoadBalancers>,
    firewalls: Arc<SpyFirewalls>,
}

impl SpyCloud {
    pub fn new(inner: Arc<dyn Cloud>) -> Arc<Self> {
        let state = Arc::new(Mutex::new(SpyState::default()));
        Arc::new(Self {
            droplets: Arc::new(SpyDroplets {
                inner: inner.droplets(),
                state: state.clone(),
            }),
            domains: Arc::new(SpyDomains {
                inner: inner.domains(),
                state: state.clone(),
            }),
            floating_ips: Arc::new(SpyFloatingIps {
                inner: inner.floating_ips(),
                state: state.clone(),
            }),
            volumes: Arc::new(SpyVolumes {
                inner: inner.volumes(),
                state: state.clone(),
            }),
            snapshots: Arc::new(SpySnapshots {
                inner: inner.snapshots(),
                state: state.clone(),
            }),
            keys: Arc::new(SpyKeys {
                inner: inner.keys(),
                state: state.clone(),
            }),
            tags: Arc::new(SpyTags {
                inner: inner.tags(),
                state: state.clone(),
            }),
            load_balancers: Arc::new(SpyLoadBalancers {
                inner: inner.load_balancers(),
                state: state.clone(),
            }),
            firewalls: Arc::new(SpyFirewalls {
                inner: inner.firewalls(),
                state: state.clone(),
            }),
            inner,
            state,
        })
    }

    pub fn is_clean(&self) -> bool {
        let s = lock(&self.state);
        s.droplets.is_empty()
            && s.volumes.is_empty()
            && s.snapshots.is_empty()
            && s.domains.is_empty()
            && s.records.is_empty()
            && s.floating_ips.is_empty()
            && s.keys.is_empty()
            && s.tags.is_empty()
            && s.load_balancers.is_empty()
            && s.firewalls.is_empty()
    }

    /// One line per resource that was created but never deleted.
    pub fn report(&self) -> Vec<String> {
        let s = lock(&self.state);
        let mut lines = Vec::new();
        for (id, d) in &s.droplets {
            lines.push(format!("droplet {id} ({})", d.name));
        }
        for (id, v) in &s.volumes {
            lines.push(format!("volume {id} ({})", v.name));
        }
        for (id, sn) in &s.snapshots {
            lines.push(format!("snapshot {id} ({})", sn.name));
        }
        for name in s.domains.keys() {
            lines.push(format!("domain {name}"));
        }
        for (domain, id) in s.records.keys() {
            lines.push(format!("record {id} on {domain}"));
        }
        for ip in s.floating_ips.keys() {
            lines.push(format!("floating IP {ip}"));
        }
        for (id, k) in &s.keys {
            lines.push(format!("key {id} ({})", k.name));
        }
        for name in s.tags.keys() {
            lines.push(format!("tag {name}"));
        }
        for (id, lb) in &s.load_balancers {
            lines.push(format!("load balancer {id} ({})", lb.name));
        }
        for (id, fw) in &s.firewalls {
            lines.push(format!("firewall {id} ({})", fw.name));
        }
        lines.sort();
        lines
    }
}

impl Cloud for SpyCloud {
    fn accounts(&self) -> Arc<dyn accounts::Accounts> {
        self.inner.accounts()
    }

    fn actions(&self) -> Arc<dyn actions::Actions> {
        self.inner.actions()
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
        self.inner.images()
    }

    fn keys(&self) -> Arc<dyn keys::Keys> {
        self.keys.clone()
    }

    fn load_balancers(&self) -> Arc<dyn load_balancers::LoadBalancers> {
        self.load_balancers.clone()
    }

    fn regions(&self) -> Arc<dyn regions::Regions> {
        self.inner.regions()
    }

    fn sizes(&self) -> Arc<dyn sizes::Sizes> {
        self.inner.sizes()
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

struct SpyDroplets {
    inner: Arc<dyn droplets::Droplets>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl droplets::Droplets for SpyDroplets {
    async fn create(
        &self,
        name: &str,
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<droplets::CreateOpt>,
    ) -> Result<Droplet, ApiError> {
        let droplet = self
            .inner
            .create(name, region, size, image_slug, opts)
            .await?;
        lock(&self.state).droplets.insert(droplet.id, droplet.clone());
        Ok(droplet)
    }

    async fn create_multiple(
        &self,
        names: &[String],
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<droplets::CreateMultipleOpt>,
    ) -> Result<Vec<Droplet>, ApiError> {
        let droplets = self
            .inner
            .create_multiple(names, region, size, image_slug, opts)
            .await?;
        let mut s = lock(&self.state);
        for d in &droplets {
            s.droplets.insert(d.id, d.clone());
        }
        Ok(droplets)
    }

    async fn get(&self, id: i64) -> Result<Droplet, ApiError> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.inner.delete(id).await?;
        lock(&self.state).droplets.remove(&id);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Droplet>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    fn actions(&self) -> Arc<dyn droplets::DropletActions> {
        self.inner.actions()
    }
}

struct SpyDomains {
    inner: Arc<dyn domains::Domains>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl domains::Domains for SpyDomains {
    async fn create(
        &self,
        name: &str,
        ip: &str,
        opts: Vec<domains::CreateOpt>,
    ) -> Result<Domain, ApiError> {
        let domain = self.inner.create(name, ip, opts).await?;
        lock(&self.state)
            .domains
            .insert(domain.name.clone(), domain.clone());
        Ok(domain)
    }

    async fn get(&self, name: &str) -> Result<Domain, ApiError> {
        self.inner.get(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.inner.delete(name).await?;
        lock(&self.state).domains.remove(name);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Domain>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    async fn create_record(
        &self,
        domain: &str,
        opts: Vec<domains::RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        let record = self.inner.create_record(domain, opts).await?;
        lock(&self.state)
            .records
            .insert((domain.to_string(), record.id), record.clone());
        Ok(record)
    }

    async fn get_record(&self, domain: &str, id: i64) -> Result<DomainRecord, ApiError> {
        self.inner.get_record(domain, id).await
    }

    async fn update_record(
        &self,
        domain: &str,
        id: i64,
        opts: Vec<domains::RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        self.inner.update_record(domain, id, opts).await
    }

    async fn delete_record(&self, domain: &str, id: i64) -> Result<(), ApiError> {
        self.inner.delete_record(domain, id).await?;
        lock(&self.state).records.remove(&(domain.to_string(), id));
        Ok(())
    }

    fn list_records(
        &self,
        cancel: CancellationToken,
        domain: &str,
    ) -> (Receiver<DomainRecord>, Receiver<ApiError>) {
        self.inner.list_records(cancel, domain)
    }
}

struct SpyFloatingIps {
    inner: Arc<dyn floating_ips::FloatingIps>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl floating_ips::FloatingIps for SpyFloatingIps {
    async fn create(&self, opts: Vec<floating_ips::CreateOpt>) -> Result<FloatingIp, ApiError> {
        let fip = self.inner.create(opts).await?;
        lock(&self.state)
            .floating_ips
            .insert(fip.ip.clone(), fip.clone());
        Ok(fip)
    }

    async fn get(&self, ip: &str) -> Result<FloatingIp, ApiError> {
        self.inner.get(ip).await
    }

    async fn delete(&self, ip: &str) -> Result<(), ApiError> {
        self.inner.delete(ip).await?;
        lock(&self.state).floating_ips.remove(ip);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<FloatingIp>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    fn actions(&self) -> Arc<dyn floating_ips::FloatingIpActions> {
        self.inner.actions()
    }
}

struct SpyVolumes {
    inner: Arc<dyn volumes::Volumes>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl volumes::Volumes for SpyVolumes {
    async fn create_volume(
        &self,
        name: &str,
        region: &str,
        size_gigabytes: i64,
        opts: Vec<volumes::CreateOpt>,
    ) -> Result<Volume, ApiError> {
        let volume = self
            .inner
            .create_volume(name, region, size_gigabytes, opts)
            .await?;
        lock(&self.state)
            .volumes
            .insert(volume.id.clone(), volume.clone());
        Ok(volume)
    }

    async fn get_volume(&self, id: &str) -> Result<Volume, ApiError> {
        self.inner.get_volume(id).await
    }

    async fn delete_volume(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete_volume(id).await?;
        lock(&self.state).volumes.remove(id);
        Ok(())
    }

    fn list_volumes(&self, cancel: CancellationToken) -> (Receiver<Volume>, Receiver<ApiError>) {
        self.inner.list_volumes(cancel)
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
        opts: Vec<volumes::SnapshotOpt>,
    ) -> Result<Snapshot, ApiError> {
        let snapshot = self.inner.create_snapshot(volume_id, name, opts).await?;
        lock(&self.state)
            .snapshots
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError> {
        self.inner.get_snapshot(id).await
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete_snapshot(id).await?;
        lock(&self.state).snapshots.remove(id);
        Ok(())
    }

    fn list_snapshots(
        &self,
        cancel: CancellationToken,
        volume_id: &str,
    ) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.inner.list_snapshots(cancel, volume_id)
    }

    fn actions(&self) -> Arc<dyn volumes::VolumeActions> {
        self.inner.actions()
    }
}

struct SpySnapshots {
    inner: Arc<dyn snapshots::Snapshots>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl snapshots::Snapshots for SpySnapshots {
    async fn get(&self, id: &str) -> Result<Snapshot, ApiError> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete(id).await?;
        lock(&self.state).snapshots.remove(id);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    fn list_droplet(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.inner.list_droplet(cancel)
    }

    fn list_volume(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.inner.list_volume(cancel)
    }
}

struct SpyKeys {
    inner: Arc<dyn keys::Keys>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl keys::Keys for SpyKeys {
    async fn create(
        &self,
        name: &str,
        public_key: &str,
        opts: Vec<keys::CreateOpt>,
    ) -> Result<Key, ApiError> {
        let key = self.inner.create(name, public_key, opts).await?;
        lock(&self.state).keys.insert(key.id, key.clone());
        Ok(key)
    }

    async fn get_by_id(&self, id: i64) -> Result<Key, ApiError> {
        self.inner.get_by_id(id).await
    }

    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Key, ApiError> {
        self.inner.get_by_fingerprint(fingerprint).await
    }

    async fn update_by_id(&self, id: i64, opts: Vec<keys::UpdateOpt>) -> Result<Key, ApiError> {
        self.inner.update_by_id(id, opts).await
    }

    async fn update_by_fingerprint(
        &self,
        fingerprint: &str,
        opts: Vec<keys::UpdateOpt>,
    ) -> Result<Key, ApiError> {
        self.inner.update_by_fingerprint(fingerprint, opts).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
        self.inner.delete_by_id(id).await?;
        lock(&self.state).keys.remove(&id);
        Ok(())
    }

    async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<(), ApiError> {
        self.inner.delete_by_fingerprint(fingerprint).await?;
        let mut s = lock(&self.state);
        s.keys.retain(|_, k| k.fingerprint != fingerprint);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Key>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }
}

struct SpyTags {
    inner: Arc<dyn tags::Tags>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl tags::Tags for SpyTags {
    async fn create(&self, name: &str, opts: Vec<tags::CreateOpt>) -> Result<Tag, ApiError> {
        let tag = self.inner.create(name, opts).await?;
        lock(&self.state).tags.insert(tag.name.clone(), tag.clone());
        Ok(tag)
    }

    async fn get(&self, name: &str) -> Result<Tag, ApiError> {
        self.inner.get(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.inner.delete(name).await?;
        lock(&self.state).tags.remove(name);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Tag>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    async fn tag_resources(
        &self,
        name: &str,
        resources: Vec<crate::api::types::TagResource>,
    ) -> Result<(), ApiError> {
        self.inner.tag_resources(name, resources).await
    }

    async fn untag_resources(
        &self,
        name: &str,
        resources: Vec<crate::api::types::TagResource>,
    ) -> Result<(), ApiError> {
        self.inner.untag_resources(name, resources).await
    }
}

struct SpyLoadBalancers {
    inner: Arc<dyn load_balancers::LoadBalancers>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl load_balancers::LoadBalancers for SpyLoadBalancers {
    async fn create(
        &self,
        name: &str,
        region: &str,
        forwarding_rules: Vec<ForwardingRule>,
        opts: Vec<load_balancers::CreateOpt>,
    ) -> Result<LoadBalancer, ApiError> {
        let lb = self
            .inner
            .create(name, region, forwarding_rules, opts)
            .await?;
        lock(&self.state)
            .load_balancers
            .insert(lb.id.clone(), lb.clone());
        Ok(lb)
    }

    async fn get(&self, id: &str) -> Result<LoadBalancer, ApiError> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &str,
        opts: Vec<load_balancers::CreateOpt>,
    ) -> Result<LoadBalancer, ApiError> {
        self.inner.update(id, opts).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete(id).await?;
        lock(&self.state).load_balancers.remove(id);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<LoadBalancer>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        self.inner.add_droplets(id, droplet_ids).await
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        self.inner.remove_droplets(id, droplet_ids).await
    }

    async fn add_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        self.inner.add_forwarding_rules(id, rules).await
    }

    async fn remove_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        self.inner.remove_forwarding_rules(id, rules).await
    }
}

struct SpyFirewalls {
    inner: Arc<dyn firewalls::Firewalls>,
    state: Arc<Mutex<SpyState>>,
}

#[async_trait]
impl firewalls::Firewalls for SpyFirewalls {
    async fn create(
        &self,
        name: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
        opts: Vec<firewalls::CreateOpt>,
    ) -> Result<Firewall, ApiError> {
        let fw = self
            .inner
            .create(name, inbound_rules, outbound_rules, opts)
            .await?;
        lock(&self.state).firewalls.insert(fw.id.clone(), fw.clone());
        Ok(fw)
    }

    async fn get(&self, id: &str) -> Result<Firewall, ApiError> {
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: &str,
        opts: Vec<firewalls::CreateOpt>,
    ) -> Result<Firewall, ApiError> {
        self.inner.update(id, opts).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete(id).await?;
        lock(&self.state).firewalls.remove(id);
        Ok(())
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Firewall>, Receiver<ApiError>) {
        self.inner.list(cancel)
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        self.inner.add_droplets(id, droplet_ids).await
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        self.inner.remove_droplets(id, droplet_ids).await
    }

    async fn add_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        self.inner.add_tags(id, tags).await
    }

    async fn remove_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        self.inner.remove_tags(id, tags).await
    }

    async fn add_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        self.inner.add_rules(id, inbound_rules, outbound_rules).await
    }

    async fn remove_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        self.inner
            .remove_rules(id, inbound_rules, outbound_rules)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::mock::MockCloud;
    use crate::cloud::Cloud;

    fn droplet(id: i64, name: &str) -> Droplet {
        Droplet {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn created_droplet_shows_up_in_report() {
        let mock = MockCloud::new();
        mock.droplets
            .on_create(|name, _, _, _, _| Ok(droplet(7, name)));
        let spy = SpyCloud::new(mock);

        spy.droplets()
            .create("worker", "nyc3", "1gb", "ubuntu", vec![])
            .await
            .unwrap();
        assert!(!spy.is_clean());
        assert_eq!(spy.report(), vec!["droplet 7 (worker)".to_string()]);
    }

    #[tokio::test]
    async fn deleting_clears_the_record() {
        let mock = MockCloud::new();
        mock.droplets
            .on_create(|name, _, _, _, _| Ok(droplet(7, name)));
        mock.droplets.on_delete(|_| Ok(()));
        let spy = SpyCloud::new(mock);

        spy.droplets()
            .create("worker", "nyc3", "1gb", "ubuntu", vec![])
            .await
            .unwrap();
        spy.droplets().delete(7).await.unwrap();
        assert!(spy.is_clean());
    }

    #[tokio::test]
    async fn failed_create_records_nothing() {
        let mock = MockCloud::new();
        mock.droplets
            .on_create(|_, _, _, _, _| Err(ApiError::Remote("boom".into())));
        let spy = SpyCloud::new(mock);

        let _ = spy
            .droplets()
            .create("worker", "nyc3", "1gb", "ubuntu", vec![])
            .await;
        assert!(spy.is_clean());
    }
}
