use super::drain;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let sizes = drain(&h, |cancel| h.cloud.sizes().list(cancel))?;
            let out = lua.create_table()?;
            for (i, s) in sizes.iter().enumerate() {
                out.set(i + 1, codec::size_to_lua(lua, s)?)?;
            }
            Ok(out)
        })?,
    )?;

    Ok(t)
}
