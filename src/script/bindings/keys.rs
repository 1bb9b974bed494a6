use super::drain;
use crate::api::types::KeyUpdateRequest;
use crate::cloud::keys::use_update_request;
use crate::script::codec::KeyQuery;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, (name, public_key): (String, String)| {
            let key = h
                .run(h.cloud.keys().create(&name, &public_key, vec![]))
                .map_err(codec::api_err)?;
            codec::key_to_lua(lua, &key)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let key = match codec::arg_key(&v)? {
                KeyQuery::Id(id) => h.run(h.cloud.keys().get_by_id(id)),
                KeyQuery::Fingerprint(fp) => h.run(h.cloud.keys().get_by_fingerprint(&fp)),
            }
            .map_err(codec::api_err)?;
            codec::key_to_lua(lua, &key)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "update",
        lua.create_function(move |lua, (v, spec): (Value, Table)| {
            let name: Option<String> = spec.get("name")?;
            let name = match name {
                Some(name) => name,
                None => return codec::throw("field name is required"),
            };
            let opts = vec![use_update_request(KeyUpdateRequest { name })];
            let key = match codec::arg_key(&v)? {
                KeyQuery::Id(id) => h.run(h.cloud.keys().update_by_id(id, opts)),
                KeyQuery::Fingerprint(fp) => {
                    h.run(h.cloud.keys().update_by_fingerprint(&fp, opts))
                }
            }
            .map_err(codec::api_err)?;
            codec::key_to_lua(lua, &key)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            match codec::arg_key(&v)? {
                KeyQuery::Id(id) => h.run(h.cloud.keys().delete_by_id(id)),
                KeyQuery::Fingerprint(fp) => h.run(h.cloud.keys().delete_by_fingerprint(&fp)),
            }
            .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let keys = drain(&h, |cancel| h.cloud.keys().list(cancel))?;
            let out = lua.create_table()?;
            for (i, k) in keys.iter().enumerate() {
                out.set(i + 1, codec::key_to_lua(lua, k)?)?;
            }
            Ok(out)
        })?,
    )?;

    Ok(t)
}
