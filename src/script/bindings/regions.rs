use super::drain;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let regions = drain(&h, |cancel| h.cloud.regions().list(cancel))?;
            let out = lua.create_table()?;
            for (i, r) in regions.iter().enumerate() {
                out.set(i + 1, codec::region_to_lua(lua, r)?)?;
            }
            Ok(out)
        })?,
    )?;

    Ok(t)
}
