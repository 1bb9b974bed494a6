use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, ()| {
            let account = h.run(h.cloud.accounts().get()).map_err(codec::api_err)?;
            codec::account_to_lua(lua, &account)
        })?,
    )?;

    Ok(t)
}
