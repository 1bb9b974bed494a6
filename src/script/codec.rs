//! Conversions between Lua values and API types.
//!
//! Arguments are deliberately polymorphic: anywhere a call wants a resource,
//! the script may pass the marshalled resource table itself or its bare
//! identifier. Extraction failures surface as Lua errors with a stable
//! message naming both accepted shapes.

use crate::api::types::*;
use crate::api::ApiError;
use chrono::{DateTime, SecondsFormat, Utc};
use mlua::{Lua, Table, Value};

pub fn throw<T>(msg: impl Into<String>) -> mlua::Result<T> {
    Err(mlua::Error::RuntimeError(msg.into()))
}

/// Client errors cross into the script as plain runtime errors so `pcall`
/// sees them like any other Lua failure.
pub fn api_err(e: ApiError) -> mlua::Error {
    mlua::Error::RuntimeError(e.to_string())
}

fn int_of(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(*i),
        Value::Number(n) => Some(*n as i64),
        _ => None,
    }
}

fn str_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => s.to_str().ok().map(|s| s.to_string()),
        _ => None,
    }
}

fn table_of<'lua>(v: &Value<'lua>, msg: &str) -> mlua::Result<Table<'lua>> {
    match v {
        Value::Table(t) => Ok(t.clone()),
        _ => throw(msg),
    }
}

fn req_string(t: &Table, key: &str) -> mlua::Result<String> {
    match t.get::<_, Option<String>>(key)? {
        Some(s) => Ok(s),
        None => throw(format!("field {key} is required")),
    }
}

fn opt_string(t: &Table, key: &str) -> mlua::Result<String> {
    Ok(t.get::<_, Option<String>>(key)?.unwrap_or_default())
}

fn opt_i64(t: &Table, key: &str) -> mlua::Result<i64> {
    Ok(t.get::<_, Option<i64>>(key)?.unwrap_or_default())
}

fn opt_bool(t: &Table, key: &str) -> mlua::Result<bool> {
    Ok(t.get::<_, Option<bool>>(key)?.unwrap_or_default())
}

fn opt_strings(t: &Table, key: &str) -> mlua::Result<Vec<String>> {
    Ok(t.get::<_, Option<Vec<String>>>(key)?.unwrap_or_default())
}

// =============================================================================
// Argument extraction
// =============================================================================

pub fn arg_action_id(v: &Value) -> mlua::Result<i64> {
    if let Some(id) = int_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be an Action or an ActionID")
}

pub fn arg_droplet_id(v: &Value) -> mlua::Result<i64> {
    if let Some(id) = int_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a Droplet or a DropletID")
}

pub fn arg_record_id(v: &Value) -> mlua::Result<i64> {
    if let Some(id) = int_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a DomainRecord or a RecordID")
}

pub fn arg_kernel_id(v: &Value) -> mlua::Result<i64> {
    if let Some(id) = int_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a Kernel or a KernelID")
}

pub fn arg_domain_name(v: &Value) -> mlua::Result<String> {
    if let Some(name) = str_of(v) {
        return Ok(name);
    }
    if let Value::Table(t) = v {
        if let Some(name) = t.get::<_, Option<String>>("name")? {
            return Ok(name);
        }
    }
    throw("argument must be a Domain or a DomainName")
}

pub fn arg_tag_name(v: &Value) -> mlua::Result<String> {
    if let Some(name) = str_of(v) {
        return Ok(name);
    }
    if let Value::Table(t) = v {
        if let Some(name) = t.get::<_, Option<String>>("name")? {
            return Ok(name);
        }
    }
    throw("argument must be a Tag or a TagName")
}

pub fn arg_volume_id(v: &Value) -> mlua::Result<String> {
    if let Some(id) = str_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<String>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a Volume or a VolumeID")
}

pub fn arg_snapshot_id(v: &Value) -> mlua::Result<String> {
    if let Some(id) = str_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<String>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a Snapshot or a SnapshotID")
}

pub fn arg_floating_ip(v: &Value) -> mlua::Result<String> {
    if let Some(ip) = str_of(v) {
        return Ok(ip);
    }
    if let Value::Table(t) = v {
        if let Some(ip) = t.get::<_, Option<String>>("ip")? {
            return Ok(ip);
        }
    }
    throw("argument must be a FloatingIP or an IP")
}

pub fn arg_load_balancer_id(v: &Value) -> mlua::Result<String> {
    if let Some(id) = str_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<String>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a LoadBalancer or a LoadBalancerID")
}

pub fn arg_firewall_id(v: &Value) -> mlua::Result<String> {
    if let Some(id) = str_of(v) {
        return Ok(id);
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<String>>("id")? {
            return Ok(id);
        }
    }
    throw("argument must be a Firewall or a FirewallID")
}

pub fn arg_region_slug(v: &Value) -> mlua::Result<String> {
    if let Some(slug) = str_of(v) {
        return Ok(slug);
    }
    if let Value::Table(t) = v {
        if let Some(slug) = t.get::<_, Option<String>>("slug")? {
            return Ok(slug);
        }
    }
    throw("argument must be a Region or a RegionSlug")
}

pub fn arg_size_slug(v: &Value) -> mlua::Result<String> {
    if let Some(slug) = str_of(v) {
        return Ok(slug);
    }
    if let Value::Table(t) = v {
        if let Some(slug) = t.get::<_, Option<String>>("slug")? {
            return Ok(slug);
        }
    }
    throw("argument must be a Size or a SizeSlug")
}

/// Image lookups dispatch on identifier kind: a number is an id, a string a
/// slug, a table whichever of the two it carries.
pub enum ImageKey {
    Id(i64),
    Slug(String),
}

pub fn arg_image(v: &Value) -> mlua::Result<ImageKey> {
    if let Some(id) = int_of(v) {
        return Ok(ImageKey::Id(id));
    }
    if let Some(slug) = str_of(v) {
        return Ok(ImageKey::Slug(slug));
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            if id != 0 {
                return Ok(ImageKey::Id(id));
            }
        }
        if let Some(slug) = t.get::<_, Option<String>>("slug")? {
            return Ok(ImageKey::Slug(slug));
        }
    }
    throw("argument must be an Image or an ImageID")
}

pub fn arg_image_id(v: &Value) -> mlua::Result<i64> {
    match arg_image(v)? {
        ImageKey::Id(id) => Ok(id),
        ImageKey::Slug(_) => throw("argument must be an Image or an ImageID"),
    }
}

/// SSH key lookups dispatch the same way, on id vs fingerprint.
pub enum KeyQuery {
    Id(i64),
    Fingerprint(String),
}

pub fn arg_key(v: &Value) -> mlua::Result<KeyQuery> {
    if let Some(id) = int_of(v) {
        return Ok(KeyQuery::Id(id));
    }
    if let Some(fp) = str_of(v) {
        return Ok(KeyQuery::Fingerprint(fp));
    }
    if let Value::Table(t) = v {
        if let Some(id) = t.get::<_, Option<i64>>("id")? {
            if id != 0 {
                return Ok(KeyQuery::Id(id));
            }
        }
        if let Some(fp) = t.get::<_, Option<String>>("fingerprint")? {
            return Ok(KeyQuery::Fingerprint(fp));
        }
    }
    throw("argument must be a Key or a KeyID")
}

fn arg_image_ref(v: &Value) -> mlua::Result<ImageRef> {
    match arg_image(v)? {
        ImageKey::Id(id) => Ok(ImageRef {
            id,
            slug: String::new(),
        }),
        ImageKey::Slug(slug) => Ok(ImageRef { id: 0, slug }),
    }
}

fn arg_ssh_key_ref(v: &Value) -> mlua::Result<SshKeyRef> {
    match arg_key(v)? {
        KeyQuery::Id(id) => Ok(SshKeyRef {
            id,
            fingerprint: String::new(),
        }),
        KeyQuery::Fingerprint(fingerprint) => Ok(SshKeyRef {
            id: 0,
            fingerprint,
        }),
    }
}

fn arg_volume_ref(v: &Value) -> mlua::Result<VolumeRef> {
    if let Some(id) = str_of(v) {
        return Ok(VolumeRef {
            id,
            name: String::new(),
        });
    }
    if let Value::Table(t) = v {
        let id = opt_string(t, "id")?;
        let name = opt_string(t, "name")?;
        if !id.is_empty() || !name.is_empty() {
            return Ok(VolumeRef { id, name });
        }
    }
    throw("argument must be a Volume or a VolumeID")
}

/// Everything a droplet create accepts, in one table.
pub fn arg_droplet_create(v: &Value) -> mlua::Result<DropletCreateRequest> {
    let t = table_of(v, "argument must be a table describing the droplet")?;
    let mut req = DropletCreateRequest {
        name: req_string(&t, "name")?,
        region: req_string(&t, "region")?,
        size: req_string(&t, "size")?,
        image: arg_image_ref(&t.get::<_, Value>("image")?)?,
        backups: opt_bool(&t, "backups")?,
        ipv6: opt_bool(&t, "ipv6")?,
        private_networking: opt_bool(&t, "private_networking")?,
        user_data: opt_string(&t, "user_data")?,
        tags: opt_strings(&t, "tags")?,
        ..Default::default()
    };
    if let Some(keys) = t.get::<_, Option<Vec<Value>>>("ssh_keys")? {
        req.ssh_keys = keys.iter().map(arg_ssh_key_ref).collect::<mlua::Result<_>>()?;
    }
    if let Some(volumes) = t.get::<_, Option<Vec<Value>>>("volumes")? {
        req.volumes = volumes
            .iter()
            .map(arg_volume_ref)
            .collect::<mlua::Result<_>>()?;
    }
    Ok(req)
}

pub fn arg_droplet_create_multiple(v: &Value) -> mlua::Result<DropletMultiCreateRequest> {
    let t = table_of(v, "argument must be a table describing the droplets")?;
    let names: Option<Vec<String>> = t.get("names")?;
    let names = match names {
        Some(names) if !names.is_empty() => names,
        _ => return throw("field names is required"),
    };
    let mut req = DropletMultiCreateRequest {
        names,
        region: req_string(&t, "region")?,
        size: req_string(&t, "size")?,
        image: arg_image_ref(&t.get::<_, Value>("image")?)?,
        backups: opt_bool(&t, "backups")?,
        ipv6: opt_bool(&t, "ipv6")?,
        private_networking: opt_bool(&t, "private_networking")?,
        user_data: opt_string(&t, "user_data")?,
        tags: opt_strings(&t, "tags")?,
        ..Default::default()
    };
    if let Some(keys) = t.get::<_, Option<Vec<Value>>>("ssh_keys")? {
        req.ssh_keys = keys.iter().map(arg_ssh_key_ref).collect::<mlua::Result<_>>()?;
    }
    Ok(req)
}

pub fn arg_domain_record(v: &Value) -> mlua::Result<DomainRecordEditRequest> {
    let t = table_of(v, "argument must be a table describing the record")?;
    Ok(DomainRecordEditRequest {
        kind: req_string(&t, "type")?,
        name: opt_string(&t, "name")?,
        data: opt_string(&t, "data")?,
        priority: opt_i64(&t, "priority")?,
        port: opt_i64(&t, "port")?,
        weight: opt_i64(&t, "weight")?,
    })
}

pub fn arg_forwarding_rule(v: &Value) -> mlua::Result<ForwardingRule> {
    let t = table_of(v, "argument must be a ForwardingRule")?;
    Ok(ForwardingRule {
        entry_protocol: req_string(&t, "entry_protocol")?,
        entry_port: opt_i64(&t, "entry_port")?,
        target_protocol: req_string(&t, "target_protocol")?,
        target_port: opt_i64(&t, "target_port")?,
        certificate_id: opt_string(&t, "certificate_id")?,
        tls_passthrough: opt_bool(&t, "tls_passthrough")?,
    })
}

pub fn arg_forwarding_rules(v: &Value) -> mlua::Result<Vec<ForwardingRule>> {
    let rules: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        _ => return throw("argument must be a list of ForwardingRules"),
    };
    rules.iter().map(arg_forwarding_rule).collect()
}

fn arg_health_check(v: &Value) -> mlua::Result<HealthCheck> {
    let t = table_of(v, "argument must be a HealthCheck")?;
    Ok(HealthCheck {
        protocol: opt_string(&t, "protocol")?,
        port: opt_i64(&t, "port")?,
        path: opt_string(&t, "path")?,
        check_interval_seconds: opt_i64(&t, "check_interval_seconds")?,
        response_timeout_seconds: opt_i64(&t, "response_timeout_seconds")?,
        unhealthy_threshold: opt_i64(&t, "unhealthy_threshold")?,
        healthy_threshold: opt_i64(&t, "healthy_threshold")?,
    })
}

fn arg_sticky_sessions(v: &Value) -> mlua::Result<StickySessions> {
    let t = table_of(v, "argument must be a StickySessions")?;
    Ok(StickySessions {
        kind: opt_string(&t, "type")?,
        cookie_name: opt_string(&t, "cookie_name")?,
        cookie_ttl_seconds: opt_i64(&t, "cookie_ttl_seconds")?,
    })
}

pub fn arg_load_balancer_request(v: &Value) -> mlua::Result<LoadBalancerRequest> {
    let t = table_of(v, "argument must be a table describing the load balancer")?;
    let mut req = LoadBalancerRequest {
        name: req_string(&t, "name")?,
        region: req_string(&t, "region")?,
        algorithm: opt_string(&t, "algorithm")?,
        tag: opt_string(&t, "tag")?,
        droplet_ids: t
            .get::<_, Option<Vec<i64>>>("droplet_ids")?
            .unwrap_or_default(),
        redirect_http_to_https: opt_bool(&t, "redirect_http_to_https")?,
        ..Default::default()
    };
    req.forwarding_rules = arg_forwarding_rules(&t.get::<_, Value>("forwarding_rules")?)?;
    if let Some(hc) = t.get::<_, Option<Value>>("health_check")? {
        req.health_check = Some(arg_health_check(&hc)?);
    }
    if let Some(ss) = t.get::<_, Option<Value>>("sticky_sessions")? {
        req.sticky_sessions = Some(arg_sticky_sessions(&ss)?);
    }
    Ok(req)
}

fn arg_rule_sources(v: &Value, msg: &str) -> mlua::Result<RuleSources> {
    let t = table_of(v, msg)?;
    Ok(RuleSources {
        addresses: opt_strings(&t, "addresses")?,
        droplet_ids: t
            .get::<_, Option<Vec<i64>>>("droplet_ids")?
            .unwrap_or_default(),
        load_balancer_uids: opt_strings(&t, "load_balancer_uids")?,
        tags: opt_strings(&t, "tags")?,
    })
}

pub fn arg_inbound_rules(v: &Value) -> mlua::Result<Vec<InboundRule>> {
    let rules: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        Value::Nil => Vec::new(),
        _ => return throw("argument must be a list of inbound rules"),
    };
    rules
        .iter()
        .map(|r| {
            let t = table_of(r, "argument must be an inbound rule")?;
            let mut rule = InboundRule {
                protocol: req_string(&t, "protocol")?,
                ports: opt_string(&t, "ports")?,
                sources: None,
            };
            if let Some(src) = t.get::<_, Option<Value>>("sources")? {
                rule.sources = Some(arg_rule_sources(&src, "sources must be a table")?);
            }
            Ok(rule)
        })
        .collect()
}

pub fn arg_outbound_rules(v: &Value) -> mlua::Result<Vec<OutboundRule>> {
    let rules: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        Value::Nil => Vec::new(),
        _ => return throw("argument must be a list of outbound rules"),
    };
    rules
        .iter()
        .map(|r| {
            let t = table_of(r, "argument must be an outbound rule")?;
            let mut rule = OutboundRule {
                protocol: req_string(&t, "protocol")?,
                ports: opt_string(&t, "ports")?,
                destinations: None,
            };
            if let Some(dst) = t.get::<_, Option<Value>>("destinations")? {
                rule.destinations = Some(arg_rule_sources(&dst, "destinations must be a table")?);
            }
            Ok(rule)
        })
        .collect()
}

pub fn arg_firewall_request(v: &Value) -> mlua::Result<FirewallRequest> {
    let t = table_of(v, "argument must be a table describing the firewall")?;
    Ok(FirewallRequest {
        name: req_string(&t, "name")?,
        inbound_rules: arg_inbound_rules(&t.get::<_, Value>("inbound_rules")?)?,
        outbound_rules: arg_outbound_rules(&t.get::<_, Value>("outbound_rules")?)?,
        droplet_ids: t
            .get::<_, Option<Vec<i64>>>("droplet_ids")?
            .unwrap_or_default(),
        tags: opt_strings(&t, "tags")?,
    })
}

pub fn arg_floating_ip_create(v: &Value) -> mlua::Result<FloatingIpCreateRequest> {
    let t = table_of(v, "argument must be a table describing the floating IP")?;
    let mut req = FloatingIpCreateRequest::default();
    if let Some(region) = t.get::<_, Option<Value>>("region")? {
        req.region = arg_region_slug(&region)?;
    }
    let droplet: Option<Value> = match t.get::<_, Option<Value>>("droplet")? {
        Some(d) => Some(d),
        None => t.get::<_, Option<Value>>("droplet_id")?,
    };
    if let Some(d) = droplet {
        req.droplet_id = Some(arg_droplet_id(&d)?);
    }
    Ok(req)
}

pub fn arg_volume_create(v: &Value) -> mlua::Result<VolumeCreateRequest> {
    let t = table_of(v, "argument must be a table describing the volume")?;
    Ok(VolumeCreateRequest {
        name: req_string(&t, "name")?,
        region: arg_region_slug(&t.get::<_, Value>("region")?)?,
        size_gigabytes: match t.get::<_, Option<i64>>("size_gigabytes")? {
            Some(size) => size,
            None => return throw("field size_gigabytes is required"),
        },
        description: opt_string(&t, "description")?,
    })
}

pub fn arg_tag_resources(v: &Value) -> mlua::Result<Vec<TagResource>> {
    let entries: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        _ => return throw("argument must be a list of resources"),
    };
    entries
        .iter()
        .map(|e| {
            let t = table_of(e, "argument must be a resource")?;
            Ok(TagResource {
                resource_id: req_string(&t, "resource_id")?,
                resource_type: req_string(&t, "resource_type")?,
            })
        })
        .collect()
}

pub fn arg_droplet_ids(v: &Value) -> mlua::Result<Vec<i64>> {
    let entries: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        _ => return throw("argument must be a list of Droplets or DropletIDs"),
    };
    entries.iter().map(arg_droplet_id).collect()
}

// =============================================================================
// Marshalling into Lua
// =============================================================================

fn set_time(t: &Table, key: &str, v: &Option<DateTime<Utc>>) -> mlua::Result<()> {
    if let Some(ts) = v {
        t.set(key, ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
    }
    Ok(())
}

pub fn account_to_lua<'lua>(lua: &'lua Lua, a: &Account) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("droplet_limit", a.droplet_limit)?;
    t.set("floating_ip_limit", a.floating_ip_limit)?;
    t.set("email", a.email.clone())?;
    t.set("uuid", a.uuid.clone())?;
    t.set("email_verified", a.email_verified)?;
    t.set("status", a.status.clone())?;
    Ok(t)
}

pub fn action_to_lua<'lua>(lua: &'lua Lua, a: &Action) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", a.id)?;
    t.set("status", a.status.clone())?;
    t.set("type", a.kind.clone())?;
    set_time(&t, "started_at", &a.started_at)?;
    set_time(&t, "completed_at", &a.completed_at)?;
    t.set("resource_id", a.resource_id)?;
    t.set("resource_type", a.resource_type.clone())?;
    t.set("region_slug", a.region_slug.clone())?;
    Ok(t)
}

pub fn region_to_lua<'lua>(lua: &'lua Lua, r: &Region) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("slug", r.slug.clone())?;
    t.set("name", r.name.clone())?;
    t.set("sizes", r.sizes.clone())?;
    t.set("available", r.available)?;
    t.set("features", r.features.clone())?;
    Ok(t)
}

pub fn size_to_lua<'lua>(lua: &'lua Lua, s: &Size) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("slug", s.slug.clone())?;
    t.set("memory", s.memory)?;
    t.set("vcpus", s.vcpus)?;
    t.set("disk", s.disk)?;
    t.set("price_monthly", s.price_monthly)?;
    t.set("price_hourly", s.price_hourly)?;
    t.set("transfer", s.transfer)?;
    t.set("regions", s.regions.clone())?;
    t.set("available", s.available)?;
    Ok(t)
}

pub fn image_to_lua<'lua>(lua: &'lua Lua, i: &Image) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", i.id)?;
    t.set("name", i.name.clone())?;
    t.set("type", i.kind.clone())?;
    t.set("distribution", i.distribution.clone())?;
    t.set("slug", i.slug.clone())?;
    t.set("public", i.public)?;
    t.set("regions", i.regions.clone())?;
    t.set("min_disk_size", i.min_disk_size)?;
    Ok(t)
}

pub fn key_to_lua<'lua>(lua: &'lua Lua, k: &Key) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", k.id)?;
    t.set("fingerprint", k.fingerprint.clone())?;
    t.set("name", k.name.clone())?;
    t.set("public_key", k.public_key.clone())?;
    Ok(t)
}

pub fn kernel_to_lua<'lua>(lua: &'lua Lua, k: &Kernel) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", k.id)?;
    t.set("name", k.name.clone())?;
    t.set("version", k.version.clone())?;
    Ok(t)
}

/// Interfaces keep their provider ordering but are keyed by decimal strings,
/// so `networks.v4["0"]` is stable regardless of Lua sequence conventions.
pub fn networks_to_lua<'lua>(lua: &'lua Lua, n: &Networks) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    let v4 = lua.create_table()?;
    for (i, net) in n.v4.iter().enumerate() {
        let e = lua.create_table()?;
        e.set("ip_address", net.ip_address.clone())?;
        e.set("netmask", net.netmask.clone())?;
        e.set("gateway", net.gateway.clone())?;
        e.set("type", net.kind.clone())?;
        v4.set(i.to_string(), e)?;
    }
    t.set("v4", v4)?;
    let v6 = lua.create_table()?;
    for (i, net) in n.v6.iter().enumerate() {
        let e = lua.create_table()?;
        e.set("ip_address", net.ip_address.clone())?;
        e.set("netmask", net.netmask)?;
        e.set("gateway", net.gateway.clone())?;
        e.set("type", net.kind.clone())?;
        v6.set(i.to_string(), e)?;
    }
    t.set("v6", v6)?;
    Ok(t)
}

pub fn droplet_to_lua<'lua>(lua: &'lua Lua, d: &Droplet) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", d.id)?;
    t.set("name", d.name.clone())?;
    t.set("memory", d.memory)?;
    t.set("vcpus", d.vcpus)?;
    t.set("disk", d.disk)?;
    if let Some(region) = &d.region {
        t.set("region", region_to_lua(lua, region)?)?;
    }
    if let Some(image) = &d.image {
        t.set("image", image_to_lua(lua, image)?)?;
    }
    if let Some(size) = &d.size {
        t.set("size", size_to_lua(lua, size)?)?;
    }
    t.set("size_slug", d.size_slug.clone())?;
    t.set("backup_ids", d.backup_ids.clone())?;
    t.set("snapshot_ids", d.snapshot_ids.clone())?;
    t.set("locked", d.locked)?;
    t.set("status", d.status.clone())?;
    if let Some(networks) = &d.networks {
        t.set("networks", networks_to_lua(lua, networks)?)?;
    }
    if let Some(kernel) = &d.kernel {
        t.set("kernel", kernel_to_lua(lua, kernel)?)?;
    }
    set_time(&t, "created_at", &d.created_at)?;
    t.set("tags", d.tags.clone())?;
    t.set("volumes", d.volume_ids.clone())?;
    if let Some(ip) = d.public_ipv4() {
        t.set("public_ipv4", ip)?;
    }
    if let Some(ip) = d.public_ipv6() {
        t.set("public_ipv6", ip)?;
    }
    Ok(t)
}

pub fn floating_ip_to_lua<'lua>(lua: &'lua Lua, f: &FloatingIp) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("ip", f.ip.clone())?;
    if let Some(region) = &f.region {
        t.set("region", region_to_lua(lua, region)?)?;
    }
    if let Some(droplet) = &f.droplet {
        t.set("droplet", droplet_to_lua(lua, droplet)?)?;
    }
    Ok(t)
}

pub fn volume_to_lua<'lua>(lua: &'lua Lua, v: &Volume) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", v.id.clone())?;
    t.set("name", v.name.clone())?;
    if let Some(region) = &v.region {
        t.set("region", region_to_lua(lua, region)?)?;
    }
    t.set("size_gigabytes", v.size_gigabytes)?;
    t.set("description", v.description.clone())?;
    t.set("droplet_ids", v.droplet_ids.clone())?;
    set_time(&t, "created_at", &v.created_at)?;
    Ok(t)
}

pub fn snapshot_to_lua<'lua>(lua: &'lua Lua, s: &Snapshot) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", s.id.clone())?;
    t.set("name", s.name.clone())?;
    t.set("resource_id", s.resource_id.clone())?;
    t.set("resource_type", s.resource_type.clone())?;
    t.set("regions", s.regions.clone())?;
    t.set("size_gigabytes", s.size_gigabytes)?;
    t.set("min_disk_size", s.min_disk_size)?;
    set_time(&t, "created_at", &s.created_at)?;
    Ok(t)
}

pub fn domain_to_lua<'lua>(lua: &'lua Lua, d: &Domain) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("name", d.name.clone())?;
    t.set("ttl", d.ttl)?;
    t.set("zone_file", d.zone_file.clone())?;
    Ok(t)
}

pub fn record_to_lua<'lua>(lua: &'lua Lua, r: &DomainRecord) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", r.id)?;
    t.set("type", r.kind.clone())?;
    t.set("name", r.name.clone())?;
    t.set("data", r.data.clone())?;
    t.set("priority", r.priority)?;
    t.set("port", r.port)?;
    t.set("weight", r.weight)?;
    Ok(t)
}

pub fn forwarding_rule_to_lua<'lua>(
    lua: &'lua Lua,
    r: &ForwardingRule,
) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("entry_protocol", r.entry_protocol.clone())?;
    t.set("entry_port", r.entry_port)?;
    t.set("target_protocol", r.target_protocol.clone())?;
    t.set("target_port", r.target_port)?;
    t.set("certificate_id", r.certificate_id.clone())?;
    t.set("tls_passthrough", r.tls_passthrough)?;
    Ok(t)
}

fn health_check_to_lua<'lua>(lua: &'lua Lua, h: &HealthCheck) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("protocol", h.protocol.clone())?;
    t.set("port", h.port)?;
    t.set("path", h.path.clone())?;
    t.set("check_interval_seconds", h.check_interval_seconds)?;
    t.set("response_timeout_seconds", h.response_timeout_seconds)?;
    t.set("unhealthy_threshold", h.unhealthy_threshold)?;
    t.set("healthy_threshold", h.healthy_threshold)?;
    Ok(t)
}

fn sticky_sessions_to_lua<'lua>(lua: &'lua Lua, s: &StickySessions) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("type", s.kind.clone())?;
    t.set("cookie_name", s.cookie_name.clone())?;
    t.set("cookie_ttl_seconds", s.cookie_ttl_seconds)?;
    Ok(t)
}

pub fn load_balancer_to_lua<'lua>(lua: &'lua Lua, l: &LoadBalancer) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", l.id.clone())?;
    t.set("name", l.name.clone())?;
    t.set("ip", l.ip.clone())?;
    t.set("algorithm", l.algorithm.clone())?;
    t.set("status", l.status.clone())?;
    let rules = lua.create_table()?;
    for (i, rule) in l.forwarding_rules.iter().enumerate() {
        rules.set(i + 1, forwarding_rule_to_lua(lua, rule)?)?;
    }
    t.set("forwarding_rules", rules)?;
    if let Some(hc) = &l.health_check {
        t.set("health_check", health_check_to_lua(lua, hc)?)?;
    }
    if let Some(ss) = &l.sticky_sessions {
        t.set("sticky_sessions", sticky_sessions_to_lua(lua, ss)?)?;
    }
    if let Some(region) = &l.region {
        t.set("region", region_to_lua(lua, region)?)?;
    }
    t.set("tag", l.tag.clone())?;
    t.set("droplet_ids", l.droplet_ids.clone())?;
    t.set("redirect_http_to_https", l.redirect_http_to_https)?;
    set_time(&t, "created_at", &l.created_at)?;
    Ok(t)
}

fn rule_sources_to_lua<'lua>(lua: &'lua Lua, s: &RuleSources) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("addresses", s.addresses.clone())?;
    t.set("droplet_ids", s.droplet_ids.clone())?;
    t.set("load_balancer_uids", s.load_balancer_uids.clone())?;
    t.set("tags", s.tags.clone())?;
    Ok(t)
}

pub fn firewall_to_lua<'lua>(lua: &'lua Lua, f: &Firewall) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("id", f.id.clone())?;
    t.set("name", f.name.clone())?;
    t.set("status", f.status.clone())?;
    let inbound = lua.create_table()?;
    for (i, rule) in f.inbound_rules.iter().enumerate() {
        let e = lua.create_table()?;
        e.set("protocol", rule.protocol.clone())?;
        e.set("ports", rule.ports.clone())?;
        if let Some(src) = &rule.sources {
            e.set("sources", rule_sources_to_lua(lua, src)?)?;
        }
        inbound.set(i + 1, e)?;
    }
    t.set("inbound_rules", inbound)?;
    let outbound = lua.create_table()?;
    for (i, rule) in f.outbound_rules.iter().enumerate() {
        let e = lua.create_table()?;
        e.set("protocol", rule.protocol.clone())?;
        e.set("ports", rule.ports.clone())?;
        if let Some(dst) = &rule.destinations {
            e.set("destinations", rule_sources_to_lua(lua, dst)?)?;
        }
        outbound.set(i + 1, e)?;
    }
    t.set("outbound_rules", outbound)?;
    t.set("droplet_ids", f.droplet_ids.clone())?;
    t.set("tags", f.tags.clone())?;
    set_time(&t, "created_at", &f.created_at)?;
    Ok(t)
}

pub fn tag_to_lua<'lua>(lua: &'lua Lua, tag: &Tag) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;
    t.set("name", tag.name.clone())?;
    if let Some(resources) = &tag.resources {
        let r = lua.create_table()?;
        if let Some(droplets) = &resources.droplets {
            let d = lua.create_table()?;
            d.set("count", droplets.count)?;
            if let Some(last) = &droplets.last_tagged {
                d.set("last_tagged", droplet_to_lua(lua, last)?)?;
            }
            r.set("droplets", d)?;
        }
        t.set("resources", r)?;
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval<'lua>(lua: &'lua Lua, src: &str) -> Value<'lua> {
        lua.load(src).eval().unwrap()
    }

    #[test]
    fn droplet_id_accepts_number_or_table() {
        let lua = Lua::new();
        assert_eq!(arg_droplet_id(&eval(&lua, "return 42")).unwrap(), 42);
        assert_eq!(
            arg_droplet_id(&eval(&lua, "return {id = 42}")).unwrap(),
            42
        );
        let err = arg_droplet_id(&eval(&lua, "return 'nope'")).unwrap_err();
        assert!(err
            .to_string()
            .contains("argument must be a Droplet or a DropletID"));
    }

    #[test]
    fn image_key_dispatches_on_identifier_kind() {
        let lua = Lua::new();
        assert!(matches!(
            arg_image(&eval(&lua, "return 7")).unwrap(),
            ImageKey::Id(7)
        ));
        assert!(matches!(
            arg_image(&eval(&lua, "return 'coreos-stable'")).unwrap(),
            ImageKey::Slug(s) if s == "coreos-stable"
        ));
        assert!(matches!(
            arg_image(&eval(&lua, "return {slug = 'ubuntu'}")).unwrap(),
            ImageKey::Slug(s) if s == "ubuntu"
        ));
    }

    #[test]
    fn droplet_create_requires_name() {
        let lua = Lua::new();
        let err = arg_droplet_create(&eval(&lua, "return {region = 'nyc3'}")).unwrap_err();
        assert!(err.to_string().contains("field name is required"));
    }

    #[test]
    fn droplet_create_reads_user_data_from_user_data() {
        let lua = Lua::new();
        let req = arg_droplet_create(&eval(
            &lua,
            "return {name='n', region='r', size='4gb', image='ubuntu', user_data='#!/bin/sh'}",
        ))
        .unwrap();
        assert_eq!(req.user_data, "#!/bin/sh");
        assert_eq!(req.size, "4gb");
    }

    #[test]
    fn droplet_marshals_public_addresses() {
        let lua = Lua::new();
        let d = Droplet {
            id: 42,
            networks: Some(Networks {
                v4: vec![NetworkV4 {
                    ip_address: "127.0.0.1".into(),
                    kind: "public".into(),
                    ..Default::default()
                }],
                v6: vec![],
            }),
            ..Default::default()
        };
        let t = droplet_to_lua(&lua, &d).unwrap();
        assert_eq!(t.get::<_, String>("public_ipv4").unwrap(), "127.0.0.1");
        let v4: Table = t.get::<_, Table>("networks").unwrap().get("v4").unwrap();
        let first: Table = v4.get("0").unwrap();
        assert_eq!(first.get::<_, String>("ip_address").unwrap(), "127.0.0.1");
    }

    #[test]
    fn action_timestamps_render_rfc3339() {
        let lua = Lua::new();
        let a = Action {
            id: 1,
            started_at: Some(
                DateTime::parse_from_rfc3339("1987-03-24T10:30:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            ..Default::default()
        };
        let t = action_to_lua(&lua, &a).unwrap();
        assert_eq!(
            t.get::<_, String>("started_at").unwrap(),
            "1987-03-24T10:30:00Z"
        );
        assert!(t.get::<_, Option<String>>("completed_at").unwrap().is_none());
    }

    #[test]
    fn forwarding_rule_roundtrip_keeps_all_fields() {
        let lua = Lua::new();
        let rule = arg_forwarding_rule(&eval(
            &lua,
            "return {entry_protocol='http', entry_port=80, target_protocol='http', target_port=8080}",
        ))
        .unwrap();
        assert_eq!(rule.entry_port, 80);
        assert!(!rule.tls_passthrough);
        let t = forwarding_rule_to_lua(&lua, &rule).unwrap();
        assert_eq!(t.get::<_, String>("certificate_id").unwrap(), "");
        assert_eq!(t.get::<_, bool>("tls_passthrough").unwrap(), false);
    }
}
