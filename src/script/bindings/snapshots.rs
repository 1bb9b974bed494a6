use super::drain;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_snapshot_id(&v)?;
            let snapshot = h.run(h.cloud.snapshots().get(&id)).map_err(codec::api_err)?;
            codec::snapshot_to_lua(lua, &snapshot)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_snapshot_id(&v)?;
            h.run(h.cloud.snapshots().delete(&id)).map_err(codec::api_err)
        })?,
    )?;

    macro_rules! list_binding {
        ($name:literal, $method:ident) => {{
            let h = host.clone();
            t.set(
                $name,
                lua.create_function(move |lua, ()| {
                    let snapshots = drain(&h, |cancel| h.cloud.snapshots().$method(cancel))?;
                    let out = lua.create_table()?;
                    for (i, s) in snapshots.iter().enumerate() {
                        out.set(i + 1, codec::snapshot_to_lua(lua, s)?)?;
                    }
                    Ok(out)
                })?,
            )?;
        }};
    }

    list_binding!("list", list);
    list_binding!("list_droplet", list_droplet);
    list_binding!("list_volume", list_volume);

    Ok(t)
}
