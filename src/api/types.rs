//! Wire types for the DigitalOcean v2 API.
//!
//! Entities deserialize straight off the provider's JSON. Identifier-bearing
//! integers are kept as `i64` end to end so they survive the trip into a
//! scripting runtime without precision loss.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Pagination / action-link envelopes
// =============================================================================

/// Page links as returned under `links.pages`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pages {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// A link to a long-running action, under `links.actions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionLink {
    pub id: i64,
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub href: String,
}

/// The `links` member of a response envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
    #[serde(default)]
    pub actions: Vec<ActionLink>,
}

impl Links {
    /// The provider omits `next`/`last` on the final page.
    pub fn is_last_page(&self) -> bool {
        match &self.pages {
            None => true,
            Some(p) => p.next.is_none() && p.last.is_none(),
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Account {
    #[serde(default)]
    pub droplet_limit: i64,
    #[serde(default)]
    pub floating_ip_limit: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Action {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource_id: i64,
    // Free-form by design; the provider grows new resource kinds without notice.
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub region_slug: String,
}

impl Action {
    pub fn describe(&self) -> String {
        format!(
            "action {} ({} on {} {}) {}",
            self.id, self.kind, self.resource_type, self.resource_id, self.status
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Region {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Size {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub vcpus: i64,
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub price_monthly: f64,
    #[serde(default)]
    pub price_hourly: f64,
    #[serde(default)]
    pub transfer: f64,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Image {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub distribution: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub min_disk_size: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Key {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Kernel {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NetworkV4 {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub netmask: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NetworkV6 {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub netmask: i64,
    #[serde(default)]
    pub gateway: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Interface lists in provider order; element 0 of `v4` is the canonical
/// public address when present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Networks {
    #[serde(default)]
    pub v4: Vec<NetworkV4>,
    #[serde(default)]
    pub v6: Vec<NetworkV6>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Droplet {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub vcpus: i64,
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub size_slug: String,
    #[serde(default)]
    pub backup_ids: Vec<i64>,
    #[serde(default)]
    pub snapshot_ids: Vec<i64>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub networks: Option<Networks>,
    #[serde(default)]
    pub kernel: Option<Kernel>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub volume_ids: Vec<String>,
}

impl Droplet {
    /// The first IPv4 interface, which the provider orders public-first.
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks
            .as_ref()
            .and_then(|n| n.v4.first())
            .map(|n| n.ip_address.as_str())
    }

    pub fn public_ipv6(&self) -> Option<&str> {
        self.networks
            .as_ref()
            .and_then(|n| n.v6.first())
            .map(|n| n.ip_address.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FloatingIp {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub droplet: Option<Droplet>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Volume {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size_gigabytes: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub droplet_ids: Vec<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Snapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub size_gigabytes: f64,
    #[serde(default)]
    pub min_disk_size: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Domain {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ttl: i64,
    #[serde(default)]
    pub zone_file: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DomainRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub weight: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ForwardingRule {
    #[serde(default)]
    pub entry_protocol: String,
    #[serde(default)]
    pub entry_port: i64,
    #[serde(default)]
    pub target_protocol: String,
    #[serde(default)]
    pub target_port: i64,
    #[serde(default)]
    pub certificate_id: String,
    #[serde(default)]
    pub tls_passthrough: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthCheck {
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub check_interval_seconds: i64,
    #[serde(default)]
    pub response_timeout_seconds: i64,
    #[serde(default)]
    pub unhealthy_threshold: i64,
    #[serde(default)]
    pub healthy_threshold: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StickySessions {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_ttl_seconds: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoadBalancer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub forwarding_rules: Vec<ForwardingRule>,
    #[serde(default)]
    pub health_check: Option<HealthCheck>,
    #[serde(default)]
    pub sticky_sessions: Option<StickySessions>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub droplet_ids: Vec<i64>,
    #[serde(default)]
    pub redirect_http_to_https: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Traffic origin filter of an inbound firewall rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleSources {
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub droplet_ids: Vec<i64>,
    #[serde(default)]
    pub load_balancer_uids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InboundRule {
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub ports: String,
    #[serde(default)]
    pub sources: Option<RuleSources>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutboundRule {
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub ports: String,
    #[serde(default)]
    pub destinations: Option<RuleSources>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Firewall {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub inbound_rules: Vec<InboundRule>,
    #[serde(default)]
    pub outbound_rules: Vec<OutboundRule>,
    #[serde(default)]
    pub droplet_ids: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaggedDroplets {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub last_tagged: Option<Droplet>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaggedResources {
    #[serde(default)]
    pub droplets: Option<TaggedDroplets>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Option<TaggedResources>,
}

/// One resource reference for tag/untag calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagResource {
    pub resource_id: String,
    pub resource_type: String,
}

// =============================================================================
// Request payloads
// =============================================================================

/// Image reference in a droplet create: the provider accepts a numeric id or
/// a distribution slug in the same position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub slug: String,
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.id != 0 {
            serializer.serialize_i64(self.id)
        } else {
            serializer.serialize_str(&self.slug)
        }
    }
}

/// SSH key reference in a droplet create: numeric id or fingerprint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SshKeyRef {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub fingerprint: String,
}

impl Serialize for SshKeyRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.id != 0 {
            serializer.serialize_i64(self.id)
        } else {
            serializer.serialize_str(&self.fingerprint)
        }
    }
}

/// Volume reference in a droplet create; serialized as `{"id": ...}` or
/// `{"name": ...}` depending on which side is set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Serialize for VolumeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        if !self.id.is_empty() {
            map.serialize_entry("id", &self.id)?;
        } else {
            map.serialize_entry("name", &self.name)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropletCreateRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ssh_keys: Vec<SshKeyRef>,
    pub backups: bool,
    pub ipv6: bool,
    pub private_networking: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub user_data: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub volumes: Vec<VolumeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropletMultiCreateRequest {
    pub names: Vec<String>,
    pub region: String,
    pub size: String,
    pub image: ImageRef,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ssh_keys: Vec<SshKeyRef>,
    pub backups: bool,
    pub ipv6: bool,
    pub private_networking: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub user_data: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainCreateRequest {
    pub name: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainRecordEditRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub data: String,
    pub priority: i64,
    pub port: i64,
    pub weight: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyCreateRequest {
    pub name: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyUpdateRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageUpdateRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloatingIpCreateRequest {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub droplet_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeCreateRequest {
    pub name: String,
    pub region: String,
    pub size_gigabytes: i64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotCreateRequest {
    pub volume_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagCreateRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancerRequest {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub algorithm: String,
    pub region: String,
    pub forwarding_rules: Vec<ForwardingRule>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sticky_sessions: Option<StickySessions>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub droplet_ids: Vec<i64>,
    pub redirect_http_to_https: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inbound_rules: Vec<InboundRule>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outbound_rules: Vec<OutboundRule>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub droplet_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_ref_serializes_as_id_or_slug() {
        let by_id = ImageRef {
            id: 42,
            slug: String::new(),
        };
        assert_eq!(serde_json::to_value(&by_id).unwrap(), json!(42));

        let by_slug = ImageRef {
            id: 0,
            slug: "coreos-stable".into(),
        };
        assert_eq!(
            serde_json::to_value(&by_slug).unwrap(),
            json!("coreos-stable")
        );
    }

    #[test]
    fn links_last_page_detection() {
        let last: Links = serde_json::from_value(json!({
            "pages": {"first": "f", "prev": "p"}
        }))
        .unwrap();
        assert!(last.is_last_page());

        let middle: Links = serde_json::from_value(json!({
            "pages": {"next": "n", "last": "l"}
        }))
        .unwrap();
        assert!(!middle.is_last_page());

        assert!(Links::default().is_last_page());
    }

    #[test]
    fn droplet_public_addresses_use_provider_order() {
        let d: Droplet = serde_json::from_value(json!({
            "id": 42,
            "networks": {
                "v4": [
                    {"ip_address": "104.131.186.241", "type": "public"},
                    {"ip_address": "10.0.0.2", "type": "private"}
                ],
                "v6": []
            }
        }))
        .unwrap();
        assert_eq!(d.public_ipv4(), Some("104.131.186.241"));
        assert_eq!(d.public_ipv6(), None);
    }

    #[test]
    fn action_timestamps_parse_rfc3339() {
        let a: Action = serde_json::from_value(json!({
            "id": 42,
            "status": "in-progress",
            "type": "create",
            "started_at": "1987-03-24T10:30:00Z",
            "resource_id": 1,
            "resource_type": "droplet"
        }))
        .unwrap();
        assert_eq!(
            a.started_at.unwrap().to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            "1987-03-24T10:30:00Z"
        );
        assert!(a.completed_at.is_none());
    }
}
