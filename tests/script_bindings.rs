//! End to end scripting tests: Lua in, mock client out.

mod common;

use chrono::{TimeZone, Utc};
use common::Harness;
use dolua::api::types::{
    Action, Domain, Droplet, FloatingIp, ForwardingRule, Key, NetworkV4, Networks, Region,
    Snapshot, Volume,
};
use dolua::api::ApiError;
use dolua::cloud::mock::{channel_err, channel_of};
use std::sync::{Arc, Mutex};

fn droplet_fixture() -> Droplet {
    Droplet {
        id: 42,
        name: "lama".to_string(),
        region: Some(Region {
            slug: "nyc3".to_string(),
            ..Default::default()
        }),
        size_slug: "4gb".to_string(),
        networks: Some(Networks {
            v4: vec![NetworkV4 {
                ip_address: "127.0.0.1".to_string(),
                kind: "public".to_string(),
                ..Default::default()
            }],
            v6: vec![],
        }),
        volume_ids: vec!["vol-1".to_string(), "vol-2".to_string()],
        ..Default::default()
    }
}

#[test]
fn droplet_create_marshals_the_response() {
    let h = Harness::new();
    h.mock.droplets.on_create(|_, _, _, _, _| Ok(droplet_fixture()));
    h.exec(
        r#"
        local d = cloud.droplets.create({
            name = "lama",
            region = "nyc3",
            size = "4gb",
            image = "ubuntu-14-04-x64",
        })
        assert(d.id == 42, "unexpected id: " .. tostring(d.id))
        assert(d.name == "lama", "unexpected name: " .. tostring(d.name))
        assert(d.public_ipv4 == "127.0.0.1", "unexpected address: " .. tostring(d.public_ipv4))
        assert(d.region.slug == "nyc3", "unexpected region: " .. tostring(d.region.slug))
        assert(d.size_slug == "4gb", "unexpected size: " .. tostring(d.size_slug))
        assert(d.volumes[1] == "vol-1" and d.volumes[2] == "vol-2",
            "unexpected volumes: " .. tostring(d.volumes[1]))
        assert(d.volume_ids == nil, "attached volumes belong under the volumes key")
        "#,
    );
}

#[test]
fn droplet_create_requires_a_name() {
    let h = Harness::new();
    let err = h.exec_err(r#"cloud.droplets.create({region = "nyc3"})"#);
    assert!(err.contains("field name is required"), "got: {err}");
}

#[test]
fn droplet_delete_accepts_id_or_table() {
    let h = Harness::new();
    h.mock.droplets.on_delete(|id| {
        if id == 42 {
            Ok(())
        } else {
            Err(ApiError::Remote(format!("unexpected id {id}")))
        }
    });
    h.exec("cloud.droplets.delete(42)");
    h.exec("cloud.droplets.delete({id = 42})");

    let err = h.exec_err(r#"cloud.droplets.delete("not a droplet")"#);
    assert!(
        err.contains("argument must be a Droplet or a DropletID"),
        "got: {err}"
    );
}

#[test]
fn action_timestamps_render_rfc3339() {
    let h = Harness::new();
    h.mock.actions.on_get(|id| {
        Ok(Action {
            id,
            status: "done".to_string(),
            kind: "create".to_string(),
            started_at: Some(Utc.with_ymd_and_hms(1987, 3, 24, 10, 30, 0).unwrap()),
            ..Default::default()
        })
    });
    h.exec(
        r#"
        local a = cloud.actions.get(93)
        assert(a.id == 93)
        assert(a.status == "done")
        assert(a.type == "create")
        assert(a.started_at == "1987-03-24T10:30:00Z",
            "unexpected started_at: " .. tostring(a.started_at))
        "#,
    );
}

#[test]
fn droplet_list_collects_every_page() {
    let h = Harness::new();
    h.mock.droplets.on_list(|_| {
        channel_of(vec![
            Droplet {
                id: 1,
                name: "one".to_string(),
                ..Default::default()
            },
            Droplet {
                id: 2,
                name: "two".to_string(),
                ..Default::default()
            },
            Droplet {
                id: 3,
                name: "three".to_string(),
                ..Default::default()
            },
        ])
    });
    h.exec(
        r#"
        local list = cloud.droplets.list()
        assert(#list == 3, "unexpected length: " .. #list)
        assert(list[1].name == "one")
        assert(list[2].name == "two")
        assert(list[3].name == "three")
        "#,
    );
}

#[test]
fn listing_failures_become_script_errors() {
    let h = Harness::new();
    h.mock
        .droplets
        .on_list(|_| channel_err(ApiError::Remote("throw me".to_string())));
    h.exec(
        r#"
        local ok, err = pcall(cloud.droplets.list)
        assert(not ok, "listing should have failed")
        assert(string.find(tostring(err), "throw me", 1, true),
            "unexpected error: " .. tostring(err))
        "#,
    );
}

#[test]
fn client_errors_are_catchable_with_pcall() {
    let h = Harness::new();
    h.mock
        .droplets
        .on_get(|_| Err(ApiError::Remote("throw me".to_string())));
    h.exec(
        r#"
        local ok, err = pcall(cloud.droplets.get, 42)
        assert(not ok, "get should have failed")
        assert(string.find(tostring(err), "throw me", 1, true),
            "unexpected error: " .. tostring(err))
        "#,
    );
}

#[test]
fn unarmed_mock_operations_fail_loudly() {
    let h = Harness::new();
    let err = h.exec_err("cloud.keys.list()");
    assert!(err.contains("not implemented by this mock"), "got: {err}");
}

#[test]
fn load_balancer_rules_carry_all_fields() {
    let h = Harness::new();
    let seen: Arc<Mutex<Vec<(String, String, Vec<ForwardingRule>)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();
    h.mock
        .load_balancers
        .on_forwarding_rules(move |verb, id, rules| {
            record
                .lock()
                .unwrap()
                .push((verb.to_string(), id.to_string(), rules));
            Ok(())
        });
    h.exec(
        r#"
        cloud.load_balancers.add_forwarding_rules("test-uuid", {
            {
                entry_protocol = "http",
                entry_port = 80,
                target_protocol = "http",
                target_port = 8080,
            },
        })
        "#,
    );
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (verb, id, rules) = &seen[0];
    assert_eq!(verb, "add");
    assert_eq!(id, "test-uuid");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].entry_protocol, "http");
    assert_eq!(rules[0].entry_port, 80);
    assert_eq!(rules[0].target_protocol, "http");
    assert_eq!(rules[0].target_port, 8080);
    assert_eq!(rules[0].certificate_id, "");
    assert!(!rules[0].tls_passthrough);
}

#[test]
fn droplet_actions_dispatch_by_name() {
    let h = Harness::new();
    let calls: Arc<Mutex<Vec<(String, i64)>>> = Arc::new(Mutex::new(Vec::new()));
    let record = calls.clone();
    h.mock.droplets.actions.on_any(move |kind, id| {
        record.lock().unwrap().push((kind.to_string(), id));
        Ok(())
    });
    h.exec(
        r#"
        cloud.droplets.actions.reboot(42)
        cloud.droplets.actions.power_off({id = 7})
        cloud.droplets.actions.enable_ipv6(9)
        "#,
    );
    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            ("reboot".to_string(), 42),
            ("power_off".to_string(), 7),
            ("enable_ipv6".to_string(), 9),
        ]
    );
}

#[test]
fn domain_records_nest_under_the_zone() {
    let h = Harness::new();
    h.mock.domains.on_create_record(|domain, opts| {
        assert_eq!(domain, "example.com");
        let mut req = Default::default();
        for opt in opts {
            opt(&mut req);
        }
        assert_eq!(req.kind, "A");
        assert_eq!(req.name, "www");
        assert_eq!(req.data, "127.0.0.1");
        Ok(dolua::api::types::DomainRecord {
            id: 7,
            kind: "A".to_string(),
            name: "www".to_string(),
            data: "127.0.0.1".to_string(),
            ..Default::default()
        })
    });
    h.exec(
        r#"
        local r = cloud.domains.create_record("example.com", {
            type = "A",
            name = "www",
            data = "127.0.0.1",
        })
        assert(r.id == 7)
        assert(r.type == "A")
        "#,
    );
}

#[test]
fn keys_resolve_by_id_or_fingerprint() {
    let h = Harness::new();
    h.mock.keys.on_get_by_id(|id| {
        Ok(Key {
            id,
            name: "by-id".to_string(),
            ..Default::default()
        })
    });
    h.mock.keys.on_get_by_fingerprint(|fp| {
        Ok(Key {
            fingerprint: fp.to_string(),
            name: "by-fingerprint".to_string(),
            ..Default::default()
        })
    });
    h.exec(
        r#"
        assert(cloud.keys.get(12).name == "by-id")
        assert(cloud.keys.get("aa:bb:cc").name == "by-fingerprint")
        assert(cloud.keys.get({fingerprint = "aa:bb:cc"}).name == "by-fingerprint")
        "#,
    );
}

#[test]
fn volumes_attach_accepts_marshalled_arguments() {
    let h = Harness::new();
    h.mock.volumes.on_get_volume(|id| {
        Ok(Volume {
            id: id.to_string(),
            name: "data".to_string(),
            ..Default::default()
        })
    });
    h.mock.volumes.actions.on_attach(|volume_id, droplet_id| {
        assert_eq!(volume_id, "vol-1");
        assert_eq!(droplet_id, 42);
        Ok(())
    });
    h.exec(
        r#"
        local v = cloud.volumes.get_volume("vol-1")
        cloud.volumes.actions.attach(v, 42)
        cloud.volumes.actions.attach("vol-1", {id = 42})
        "#,
    );
}

#[test]
fn volume_and_snapshot_creates_carry_the_description() {
    let h = Harness::new();
    h.mock
        .volumes
        .on_create_volume(|name, region, size, opts| {
            let mut req = Default::default();
            for opt in opts {
                opt(&mut req);
            }
            assert_eq!(name, "data");
            assert_eq!(region, "nyc3");
            assert_eq!(size, 100);
            assert_eq!(req.description, "scratch space");
            Ok(Volume {
                id: "vol-1".to_string(),
                name: name.to_string(),
                ..Default::default()
            })
        });
    h.mock
        .volumes
        .on_create_snapshot(|volume_id, name, opts| {
            let mut req = Default::default();
            for opt in opts {
                opt(&mut req);
            }
            assert_eq!(volume_id, "vol-1");
            assert_eq!(name, "before-resize");
            assert_eq!(req.description, "nightly");
            Ok(Snapshot {
                id: "snap-1".to_string(),
                name: name.to_string(),
                ..Default::default()
            })
        });
    h.exec(
        r#"
        local v = cloud.volumes.create_volume({
            name = "data",
            region = "nyc3",
            size_gigabytes = 100,
            description = "scratch space",
        })
        local s = cloud.volumes.create_snapshot(v, "before-resize", "nightly")
        assert(s.id == "snap-1")
        "#,
    );
}

#[test]
fn floating_ip_create_passes_region_and_droplet() {
    let h = Harness::new();
    h.mock.floating_ips.on_create(|opts| {
        let mut req = Default::default();
        for opt in opts {
            opt(&mut req);
        }
        assert_eq!(req.region, "nyc3");
        assert_eq!(req.droplet_id, Some(42));
        Ok(FloatingIp {
            ip: "1.2.3.4".to_string(),
            ..Default::default()
        })
    });
    h.exec(
        r#"
        local ip = cloud.floating_ips.create({region = "nyc3", droplet = 42})
        assert(ip.ip == "1.2.3.4")
        "#,
    );
}

#[test]
fn prelude_helpers_are_available() {
    let h = Harness::new();
    h.exec(
        r#"
        assert(string.startswith("droplet-1", "droplet"))
        assert(string.endswith("droplet-1", "-1"))
        assert(string.trim("  x  ") == "x")
        assert(table.contains({"a", "b"}, "b"))
        "#,
    );
}

#[test]
fn domains_list_is_one_indexed() {
    let h = Harness::new();
    h.mock.domains.on_list(|_| {
        channel_of(vec![
            Domain {
                name: "a.com".to_string(),
                ..Default::default()
            },
            Domain {
                name: "b.com".to_string(),
                ..Default::default()
            },
        ])
    });
    h.exec(
        r#"
        local list = cloud.domains.list()
        assert(list[0] == nil)
        assert(list[1].name == "a.com")
        assert(list[2].name == "b.com")
        "#,
    );
}
