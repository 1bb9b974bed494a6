use super::drain;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, name: String| {
            let tag = h
                .run(h.cloud.tags().create(&name, vec![]))
                .map_err(codec::api_err)?;
            codec::tag_to_lua(lua, &tag)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let name = codec::arg_tag_name(&v)?;
            let tag = h.run(h.cloud.tags().get(&name)).map_err(codec::api_err)?;
            codec::tag_to_lua(lua, &tag)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let name = codec::arg_tag_name(&v)?;
            h.run(h.cloud.tags().delete(&name)).map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let tags = drain(&h, |cancel| h.cloud.tags().list(cancel))?;
            let out = lua.create_table()?;
            for (i, tag) in tags.iter().enumerate() {
                out.set(i + 1, codec::tag_to_lua(lua, tag)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "tag_resources",
        lua.create_function(move |_, (v, resources): (Value, Value)| {
            let name = codec::arg_tag_name(&v)?;
            let resources = codec::arg_tag_resources(&resources)?;
            h.run(h.cloud.tags().tag_resources(&name, resources))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "untag_resources",
        lua.create_function(move |_, (v, resources): (Value, Value)| {
            let name = codec::arg_tag_name(&v)?;
            let resources = codec::arg_tag_resources(&resources)?;
            h.run(h.cloud.tags().untag_resources(&name, resources))
                .map_err(codec::api_err)
        })?,
    )?;

    Ok(t)
}
