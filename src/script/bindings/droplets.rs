use super::drain;
use crate::cloud::droplets::{use_multi_request, use_request};
use crate::script::codec::ImageKey;
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_droplet_create(&v)?;
            let (name, region, size) = (req.name.clone(), req.region.clone(), req.size.clone());
            let image_slug = req.image.slug.clone();
            let droplet = h
                .run(h.cloud.droplets().create(
                    &name,
                    &region,
                    &size,
                    &image_slug,
                    vec![use_request(req)],
                ))
                .map_err(codec::api_err)?;
            codec::droplet_to_lua(lua, &droplet)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "create_multiple",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_droplet_create_multiple(&v)?;
            let names = req.names.clone();
            let (region, size) = (req.region.clone(), req.size.clone());
            let image_slug = req.image.slug.clone();
            let droplets = h
                .run(h.cloud.droplets().create_multiple(
                    &names,
                    &region,
                    &size,
                    &image_slug,
                    vec![use_multi_request(req)],
                ))
                .map_err(codec::api_err)?;
            let out = lua.create_table()?;
            for (i, d) in droplets.iter().enumerate() {
                out.set(i + 1, codec::droplet_to_lua(lua, d)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_droplet_id(&v)?;
            let droplet = h.run(h.cloud.droplets().get(id)).map_err(codec::api_err)?;
            codec::droplet_to_lua(lua, &droplet)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_droplet_id(&v)?;
            h.run(h.cloud.droplets().delete(id)).map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list",
        lua.create_function(move |lua, ()| {
            let droplets = drain(&h, |cancel| h.cloud.droplets().list(cancel))?;
            let out = lua.create_table()?;
            for (i, d) in droplets.iter().enumerate() {
                out.set(i + 1, codec::droplet_to_lua(lua, d)?)?;
            }
            Ok(out)
        })?,
    )?;

    t.set("actions", actions_table(lua, host)?)?;

    Ok(t)
}

/// Every action call returns only once the provider reports the action done.
fn actions_table<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    macro_rules! simple_action {
        ($name:literal, $method:ident) => {{
            let h = host.clone();
            t.set(
                $name,
                lua.create_function(move |_, v: Value| {
                    let id = codec::arg_droplet_id(&v)?;
                    h.run(h.cloud.droplets().actions().$method(id))
                        .map_err(codec::api_err)
                })?,
            )?;
        }};
    }

    simple_action!("shutdown", shutdown);
    simple_action!("power_off", power_off);
    simple_action!("power_on", power_on);
    simple_action!("power_cycle", power_cycle);
    simple_action!("reboot", reboot);
    simple_action!("enable_backups", enable_backups);
    simple_action!("disable_backups", disable_backups);
    simple_action!("password_reset", password_reset);
    simple_action!("enable_ipv6", enable_ipv6);
    simple_action!("enable_private_networking", enable_private_networking);
    simple_action!("upgrade", upgrade);

    let h = host.clone();
    t.set(
        "restore",
        lua.create_function(move |_, (d, img): (Value, Value)| {
            let id = codec::arg_droplet_id(&d)?;
            let image_id = codec::arg_image_id(&img)?;
            h.run(h.cloud.droplets().actions().restore(id, image_id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "resize",
        lua.create_function(
            move |_, (d, size, disk): (Value, Value, Option<bool>)| {
                let id = codec::arg_droplet_id(&d)?;
                let slug = codec::arg_size_slug(&size)?;
                h.run(h.cloud.droplets().actions().resize(
                    id,
                    &slug,
                    disk.unwrap_or_default(),
                ))
                .map_err(codec::api_err)
            },
        )?,
    )?;

    let h = host.clone();
    t.set(
        "rename",
        lua.create_function(move |_, (d, name): (Value, String)| {
            let id = codec::arg_droplet_id(&d)?;
            h.run(h.cloud.droplets().actions().rename(id, &name))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "snapshot",
        lua.create_function(move |_, (d, name): (Value, String)| {
            let id = codec::arg_droplet_id(&d)?;
            h.run(h.cloud.droplets().actions().snapshot(id, &name))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "rebuild",
        lua.create_function(move |_, (d, img): (Value, Value)| {
            let id = codec::arg_droplet_id(&d)?;
            let actions = h.cloud.droplets().actions();
            match codec::arg_image(&img)? {
                ImageKey::Id(image_id) => h
                    .run(actions.rebuild_by_image_id(id, image_id))
                    .map_err(codec::api_err),
                ImageKey::Slug(slug) => h
                    .run(actions.rebuild_by_image_slug(id, &slug))
                    .map_err(codec::api_err),
            }
        })?,
    )?;

    let h = host.clone();
    t.set(
        "change_kernel",
        lua.create_function(move |_, (d, kernel): (Value, Value)| {
            let id = codec::arg_droplet_id(&d)?;
            let kernel_id = codec::arg_kernel_id(&kernel)?;
            h.run(h.cloud.droplets().actions().change_kernel(id, kernel_id))
                .map_err(codec::api_err)
        })?,
    )?;

    Ok(t)
}
