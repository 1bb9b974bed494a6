use super::drain;
use crate::cloud::firewalls::use_request;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_firewall_request(&v)?;
            let name = req.name.clone();
            let inbound = req.inbound_rules.clone();
            let outbound = req.outbound_rules.clone();
            let firewall = h
                .run(h.cloud.firewalls().create(
                    &name,
                    inbound,
                    outbound,
                    vec![use_request(req)],
                ))
                .map_err(codec::api_err)?;
            codec::firewall_to_lua(lua, &firewall)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_firewall_id(&v)?;
            let firewall = h.run(h.cloud.firewalls().get(&id)).map_err(codec::api_err)?;
            codec::firewall_to_lua(lua, &firewall)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "update",
        lua.create_function(move |lua, (v, spec): (Value, Value)| {
            let id = codec::arg_firewall_id(&v)?;
            let req = codec::arg_firewall_request(&spec)?;
            let firewall = h
                .run(h.cloud.firewalls().update(&id, vec![use_request(req)]))
                .map_err(codec::api_err)?;
            codec::firewall_to_lua(lua, &firewall)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_firewall_id(&v)?;
            h.run(h.cloud.firewalls().delete(&id)).map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let firewalls = drain(&h, |cancel| h.cloud.firewalls().list(cancel))?;
            let out = lua.create_table()?;
            for (i, f) in firewalls.iter().enumerate() {
                out.set(i + 1, codec::firewall_to_lua(lua, f)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "add_droplets",
        lua.create_function(move |_, (v, droplets): (Value, Value)| {
            let id = codec::arg_firewall_id(&v)?;
            let ids = codec::arg_droplet_ids(&droplets)?;
            h.run(h.cloud.firewalls().add_droplets(&id, ids))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "remove_droplets",
        lua.create_function(move |_, (v, droplets): (Value, Value)| {
            let id = codec::arg_firewall_id(&v)?;
            let ids = codec::arg_droplet_ids(&droplets)?;
            h.run(h.cloud.firewalls().remove_droplets(&id, ids))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "add_tags",
        lua.create_function(move |_, (v, tags): (Value, Value)| {
            let id = codec::arg_firewall_id(&v)?;
            let tags = tag_names(&tags)?;
            h.run(h.cloud.firewalls().add_tags(&id, tags))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "remove_tags",
        lua.create_function(move |_, (v, tags): (Value, Value)| {
            let id = codec::arg_firewall_id(&v)?;
            let tags = tag_names(&tags)?;
            h.run(h.cloud.firewalls().remove_tags(&id, tags))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "add_rules",
        lua.create_function(move |_, (v, spec): (Value, Table)| {
            let id = codec::arg_firewall_id(&v)?;
            let inbound = codec::arg_inbound_rules(&spec.get::<_, Value>("inbound_rules")?)?;
            let outbound = codec::arg_outbound_rules(&spec.get::<_, Value>("outbound_rules")?)?;
            h.run(h.cloud.firewalls().add_rules(&id, inbound, outbound))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "remove_rules",
        lua.create_function(move |_, (v, spec): (Value, Table)| {
            let id = codec::arg_firewall_id(&v)?;
            let inbound = codec::arg_inbound_rules(&spec.get::<_, Value>("inbound_rules")?)?;
            let outbound = codec::arg_outbound_rules(&spec.get::<_, Value>("outbound_rules")?)?;
            h.run(h.cloud.firewalls().remove_rules(&id, inbound, outbound))
                .map_err(codec::api_err)
        })?,
    )?;

    Ok(t)
}

fn tag_names(v: &Value) -> mlua::Result<Vec<String>> {
    let entries: Vec<Value> = match v {
        Value::Table(t) => t.clone().sequence_values().collect::<mlua::Result<_>>()?,
        _ => return codec::throw("argument must be a list of Tags or TagNames"),
    };
    entries.iter().map(codec::arg_tag_name).collect()
}
