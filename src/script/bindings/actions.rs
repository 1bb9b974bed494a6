use super::drain;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_action_id(&v)?;
            let action = h.run(h.cloud.actions().get(id)).map_err(codec::api_err)?;
            codec::action_to_lua(lua, &action)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let actions = drain(&h, |cancel| h.cloud.actions().list(cancel))?;
            let out = lua.create_table()?;
            for (i, a) in actions.iter().enumerate() {
                out.set(i + 1, codec::action_to_lua(lua, a)?)?;
            }
            Ok(out)
        })?,
    )?;

    Ok(t)
}
