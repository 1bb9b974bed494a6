use super::drain;
use crate::cloud::volumes::{set_snapshot_description, use_request};
use crate::script::{codec, ScriptHost};
use mlua::{Lua, Table, Value};

pub fn apply<'lua>(lua: &'lua Lua, host: &ScriptHost) -> mlua::Result<Table<'lua>> {
    let t = lua.create_table()?;

    let h = host.clone();
    t.set(
        "create_volume",
        lua.create_function(move |lua, v: Value| {
            let req = codec::arg_volume_create(&v)?;
            let (name, region) = (req.name.clone(), req.region.clone());
            let size = req.size_gigabytes;
            let volume = h
                .run(h.cloud.volumes().create_volume(
                    &name,
                    &region,
                    size,
                    vec![use_request(req)],
                ))
                .map_err(codec::api_err)?;
            codec::volume_to_lua(lua, &volume)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "get_volume",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_volume_id(&v)?;
            let volume = h
                .run(h.cloud.volumes().get_volume(&id))
                .map_err(codec::api_err)?;
            codec::volume_to_lua(lua, &volume)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete_volume",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_volume_id(&v)?;
            h.run(h.cloud.volumes().delete_volume(&id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list_volumes",
        lua.create_function(move |lua, ()| {
            let volumes = drain(&h, |cancel| h.cloud.volumes().list_volumes(cancel))?;
            let out = lua.create_table()?;
            for (i, v) in volumes.iter().enumerate() {
                out.set(i + 1, codec::volume_to_lua(lua, v)?)?;
            }
            Ok(out)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "create_snapshot",
        lua.create_function(
            move |lua, (v, name, desc): (Value, String, Option<String>)| {
                let volume_id = codec::arg_volume_id(&v)?;
                let mut opts = Vec::new();
                if let Some(desc) = desc {
                    opts.push(set_snapshot_description(desc));
                }
                let snapshot = h
                    .run(h.cloud.volumes().create_snapshot(&volume_id, &name, opts))
                    .map_err(codec::api_err)?;
                codec::snapshot_to_lua(lua, &snapshot)
            },
        )?,
    )?;

    let h = host.clone();
    t.set(
        "get_snapshot",
        lua.create_function(move |lua, v: Value| {
            let id = codec::arg_snapshot_id(&v)?;
            let snapshot = h
                .run(h.cloud.volumes().get_snapshot(&id))
                .map_err(codec::api_err)?;
            codec::snapshot_to_lua(lua, &snapshot)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "delete_snapshot",
        lua.create_function(move |_, v: Value| {
            let id = codec::arg_snapshot_id(&v)?;
            h.run(h.cloud.volumes().delete_snapshot(&id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    t.set(
        "list_snapshots",
        lua.create_function(move |lua, v: Value| {
            let volume_id = codec::arg_volume_id(&v)?;
            let snapshots = drain(&h, |cancel| {
                h.cloud.volumes().list_snapshots(cancel, &volume_id)
            })?;
            let out = lua.create_table()?;
            for (i, s) in snapshots.iter().enumerate() {
                out.set(i + 1, codec::snapshot_to_lua(lua, s)?)?;
            }
            Ok(out)
        })?,
    )?;

    let actions = lua.create_table()?;

    let h = host.clone();
    actions.set(
        "attach",
        lua.create_function(move |_, (v, d): (Value, Value)| {
            let volume_id = codec::arg_volume_id(&v)?;
            let droplet_id = codec::arg_droplet_id(&d)?;
            h.run(h.cloud.volumes().actions().attach(&volume_id, droplet_id))
                .map_err(codec::api_err)
        })?,
    )?;

    let h = host.clone();
    actions.set(
        "detach_by_droplet_id",
        lua.create_function(move |_, (v, d): (Value, Value)| {
            let volume_id = codec::arg_volume_id(&v)?;
            let droplet_id = codec::arg_droplet_id(&d)?;
            h.run(
                h.cloud
                    .volumes()
                    .actions()
                    .detach_by_droplet_id(&volume_id, droplet_id),
            )
            .map_err(codec::api_err)
        })?,
    )?;

    t.set("actions", actions)?;

    Ok(t)
}
