//! Resource clients for the DigitalOcean API, aggregated behind the
//! [`Cloud`] trait. Scripts and tests only ever see `Arc<dyn Cloud>`, so the
//! real HTTP client, [`mock::MockCloud`] and [`spy::SpyCloud`] are
//! interchangeable.

use crate::api::{ApiError, Sdk};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod accounts;
pub mod actions;
pub mod domains;
pub mod droplets;
pub mod firewalls;
pub mod floating_ips;
pub mod images;
pub mod keys;
pub mod load_balancers;
pub mod mock;
pub mod regions;
pub mod sizes;
pub mod snapshots;
pub mod spy;
pub mod tags;
pub mod volumes;

pub use accounts::Accounts;
pub use actions::Actions;
pub use domains::Domains;
pub use droplets::{DropletActions, Droplets};
pub use firewalls::Firewalls;
pub use floating_ips::{FloatingIpActions, FloatingIps};
pub use images::Images;
pub use keys::Keys;
pub use load_balancers::LoadBalancers;
pub use regions::Regions;
pub use sizes::Sizes;
pub use snapshots::Snapshots;
pub use tags::Tags;
pub use volumes::{VolumeActions, Volumes};

/// One client per resource family the provider exposes.
pub trait Cloud: Send + Sync {
    fn accounts(&self) -> Arc<dyn Accounts>;
    fn actions(&self) -> Arc<dyn Actions>;
    fn domains(&self) -> Arc<dyn Domains>;
    fn droplets(&self) -> Arc<dyn Droplets>;
    fn firewalls(&self) -> Arc<dyn Firewalls>;
    fn floating_ips(&self) -> Arc<dyn FloatingIps>;
    fn images(&self) -> Arc<dyn Images>;
    fn keys(&self) -> Arc<dyn Keys>;
    fn load_balancers(&self) -> Arc<dyn LoadBalancers>;
    fn regions(&self) -> Arc<dyn Regions>;
    fn sizes(&self) -> Arc<dyn Sizes>;
    fn snapshots(&self) -> Arc<dyn Snapshots>;
    fn tags(&self) -> Arc<dyn Tags>;
    fn volumes(&self) -> Arc<dyn Volumes>;
}

/// Construction-time option for [`CloudClient::new`], applied in order.
pub type ClientOpt = Box<dyn FnOnce(&mut ClientOpts)>;

pub struct ClientOpts {
    pub sdk: Sdk,
}

/// Use a preconfigured [`Sdk`] instead of the anonymous default.
pub fn use_sdk(sdk: Sdk) -> ClientOpt {
    Box::new(move |o| o.sdk = sdk)
}

/// The live HTTP-backed implementation of [`Cloud`].
pub struct CloudClient {
    accounts: Arc<accounts::AccountsClient>,
    actions: Arc<actions::ActionsClient>,
    domains: Arc<domains::DomainsClient>,
    droplets: Arc<droplets::DropletsClient>,
    firewalls: Arc<firewalls::FirewallsClient>,
    floating_ips: Arc<floating_ips::FloatingIpsClient>,
    images: Arc<images::ImagesClient>,
    keys: Arc<keys::KeysClient>,
    load_balancers: Arc<load_balancers::LoadBalancersClient>,
    regions: Arc<regions::RegionsClient>,
    sizes: Arc<sizes::SizesClient>,
    snapshots: Arc<snapshots::SnapshotsClient>,
    tags: Arc<tags::TagsClient>,
    volumes: Arc<volumes::VolumesClient>,
}

impl CloudClient {
    /// Build a client over every resource family. `cancel` bounds the
    /// action-polling loops; dropping work mid-poll surfaces a timeout
    /// rather than hanging.
    pub fn new(cancel: CancellationToken, opts: Vec<ClientOpt>) -> Result<Self, ApiError> {
        let mut o = ClientOpts {
            sdk: Sdk::anonymous()?,
        };
        for opt in opts {
            opt(&mut o);
        }
        let sdk = o.sdk;

        Ok(Self {
            accounts: Arc::new(accounts::AccountsClient::new(sdk.clone())),
            actions: Arc::new(actions::ActionsClient::new(sdk.clone())),
            domains: Arc::new(domains::DomainsClient::new(sdk.clone())),
            droplets: Arc::new(droplets::DropletsClient::new(sdk.clone(), cancel.clone())),
            firewalls: Arc::new(firewalls::FirewallsClient::new(sdk.clone())),
            floating_ips: Arc::new(floating_ips::FloatingIpsClient::new(
                sdk.clone(),
                cancel.clone(),
            )),
            images: Arc::new(images::ImagesClient::new(sdk.clone())),
            keys: Arc::new(keys::KeysClient::new(sdk.clone())),
            load_balancers: Arc::new(load_balancers::LoadBalancersClient::new(sdk.clone())),
            regions: Arc::new(regions::RegionsClient::new(sdk.clone())),
            sizes: Arc::new(sizes::SizesClient::new(sdk.clone())),
            snapshots: Arc::new(snapshots::SnapshotsClient::new(sdk.clone())),
            tags: Arc::new(tags::TagsClient::new(sdk.clone())),
            volumes: Arc::new(volumes::VolumesClient::new(sdk, cancel)),
        })
    }
}

impl Cloud for CloudClient {
    fn accounts(&self) -> Arc<dyn Accounts> {
        self.accounts.clone()
    }

    fn actions(&self) -> Arc<dyn Actions> {
        self.actions.clone()
    }

    fn domains(&self) -> Arc<dyn Domains> {
        self.domains.clone()
    }

    fn droplets(&self) -> Arc<dyn Droplets> {
        self.droplets.clone()
    }

    fn firewalls(&self) -> Arc<dyn Firewalls> {
        self.firewalls.clone()
    }

    fn floating_ips(&self) -> Arc<dyn FloatingIps> {
        self.floating_ips.clone()
    }

    fn images(&self) -> Arc<dyn Images> {
        self.images.clone()
    }

    fn keys(&self) -> Arc<dyn Keys> {
        self.keys.clone()
    }

    fn load_balancers(&self) -> Arc<dyn LoadBalancers> {
        self.load_balancers.clone()
    }

    fn regions(&self) -> Arc<dyn Regions> {
        self.regions.clone()
    }

    fn sizes(&self) -> Arc<dyn Sizes> {
        self.sizes.clone()
    }

    fn snapshots(&self) -> Arc<dyn Snapshots> {
        self.snapshots.clone()
    }

    fn tags(&self) -> Arc<dyn Tags> {
        self.tags.clone()
    }

    fn volumes(&self) -> Arc<dyn Volumes> {
        self.volumes.clone()
    }
}
