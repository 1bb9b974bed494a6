//! Property-based tests for the Lua argument codec.
//!
//! The codec accepts either a marshalled resource table or its bare
//! identifier; these properties pin that equivalence down over randomized
//! inputs.

use dolua::api::types::{Droplet, Volume};
use dolua::script::codec;
use mlua::{Lua, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn droplet_id_roundtrips_from_number_or_table(id in 1..i64::MAX) {
        let lua = Lua::new();
        prop_assert_eq!(codec::arg_droplet_id(&Value::Integer(id)).unwrap(), id);

        let t = lua.create_table().unwrap();
        t.set("id", id).unwrap();
        prop_assert_eq!(codec::arg_droplet_id(&Value::Table(t)).unwrap(), id);
    }

    #[test]
    fn volume_id_roundtrips_from_string_or_table(id in "[a-z0-9-]{1,36}") {
        let lua = Lua::new();
        let s = lua.create_string(&id).unwrap();
        prop_assert_eq!(codec::arg_volume_id(&Value::String(s)).unwrap(), id.clone());

        let t = lua.create_table().unwrap();
        t.set("id", id.clone()).unwrap();
        prop_assert_eq!(codec::arg_volume_id(&Value::Table(t)).unwrap(), id);
    }

    #[test]
    fn marshalled_droplets_extract_back_to_their_id(
        id in 1..i64::MAX,
        name in "[a-z][a-z0-9-]{0,62}",
    ) {
        let lua = Lua::new();
        let droplet = Droplet {
            id,
            name,
            ..Default::default()
        };
        let t = codec::droplet_to_lua(&lua, &droplet).unwrap();
        prop_assert_eq!(codec::arg_droplet_id(&Value::Table(t)).unwrap(), id);
    }

    #[test]
    fn marshalled_volumes_extract_back_to_their_id(id in "[a-z0-9-]{1,36}") {
        let lua = Lua::new();
        let volume = Volume {
            id: id.clone(),
            ..Default::default()
        };
        let t = codec::volume_to_lua(&lua, &volume).unwrap();
        prop_assert_eq!(codec::arg_volume_id(&Value::Table(t)).unwrap(), id);
    }

    #[test]
    fn booleans_never_pass_for_droplet_ids(b in any::<bool>()) {
        let err = codec::arg_droplet_id(&Value::Boolean(b)).unwrap_err();
        prop_assert!(err
            .to_string()
            .contains("argument must be a Droplet or a DropletID"));
    }
}
