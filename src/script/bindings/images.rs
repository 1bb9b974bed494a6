use super::drain;
use crate::api::types::ImageUpdateRequest;
use crate::cloud::images::use_request;
use crate::script::codec::ImageKey;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let image = match codec::arg_image(&v)? {
                ImageKey::Id(id) => h.run(h.cloud.images().get_by_id(id)),
                ImageKey::Slug(slug) => h.run(h.cloud.images().get_by_slug(&slug)),
            }
            .map_err(codec::api_err)?;
            codec::image_to_lua(lua, &image)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "update",
        lua.create_function(move |lua, (v, spec): (Value, Table)| {
            let id = codec::arg_image_id(&v)?;
            let name: Option<String> = spec.get("name")?;
            let name = match name {
                Some(name) => name,
                None => return codec::throw("field name is required"),
            };
            let image = h
                .run(h.cloud.images().update(
                    id,
                    vec![use_request(ImageUpdateRequest { name })],
                ))
                .map_err(codec::api_err)?;
            codec::image_to_lua(lua, &image)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_image_id(&v)?;
            h.run(h.cloud.images().delete(id)).map_err(codec::api_err)
        })?,
    )?;

    macro_rules! list_binding {
        ($name:literal, $method:ident) => {{
            let h = host.clone();
            t.set(
                $name,
                lua.create_function(move |lua, ()| {
                    let images = drain(&h, |cancel| h.cloud.images().$method(cancel))?;
                    let out = lua.create_table()?;
                    for (i, img) in images.iter().enumerate() {
                        out.set(i + 1, codec::image_to_lua(lua, img)?)?;
                    }
                    Ok(out)
                })?,
            )?;
        }};
    }

    list_binding!("list", list);
    list_binding!("list_distribution", list_distribution);
    list_binding!("list_application", list_application);
    list_binding!("list_user", list_user);

    Ok(t)
}
