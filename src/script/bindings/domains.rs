use super::drain;
use crate::cloud::domains::use_record;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, (name, ip): (String, String)| {
            let domain = h
                .run(h.cloud.domains().create(&name, &ip, vec![]))
                .map_err(codec::api_err)?;
            codec::domain_to_lua(lua, &domain)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let name = codec::arg_domain_name(&v)?;
            let domain = h.run(h.cloud.domains().get(&name)).map_err(codec::api_err)?;
            codec::domain_to_lua(lua, &domain)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let name = codec::arg_domain_name(&v)?;
            h.run(h.cloud.domains().delete(&name)).map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let domains = drain(&h, |cancel| h.cloud.domains().list(cancel))?;
            let out = lua.create_table()?;
            for (i, d) in domains.iter().enumerate() {
                out.set(i + 1, codec::domain_to_lua(lua, d)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "records",
        lua.create_function(move |lua, v: Value| {
            let name = codec::arg_domain_name(&v)?;
            let records = drain(&h, |cancel| h.cloud.domains().list_records(cancel, &name))?;
            let out = lua.create_table()?;
            for (i, r) in records.iter().enumerate() {
                out.set(i + 1, codec::record_to_lua(lua, r)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "record",
        lua.create_function(move |lua, (d, r): (Value, Value)| {
            let name = codec::arg_domain_name(&d)?;
            let id = codec::arg_record_id(&r)?;
            let record = h
                .run(h.cloud.domains().get_record(&name, id))
                .map_err(codec::api_err)?;
            codec::record_to_lua(lua, &record)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "create_record",
        lua.create_function(move |lua, (d, spec): (Value, Value)| {
            let name = codec::arg_domain_name(&d)?;
            let req = codec::arg_domain_record(&spec)?;
            let record = h
                .run(h.cloud.domains().create_record(&name, vec![use_record(req)]))
                .map_err(codec::api_err)?;
            codec::record_to_lua(lua, &record)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "edit_record",
        lua.create_function(move |lua, (d, r, spec): (Value, Value, Value)| {
            let name = codec::arg_domain_name(&d)?;
            let id = codec::arg_record_id(&r)?;
            let req = codec::arg_domain_record(&spec)?;
            let record = h
                .run(h.cloud.domains().update_record(&name, id, vec![use_record(req)]))
                .map_err(codec::api_err)?;
            codec::record_to_lua(lua, &record)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete_record",
        lua.create_function(move |_, (d, r): (Value, Value)| {
            let name = codec::arg_domain_name(&d)?;
            let id = codec::arg_record_id(&r)?;
            h.run(h.cloud.domains().delete_record(&name, id))
                .map_err(codec::api_err)
        })?,
    )?;

    Ok(t)
}
