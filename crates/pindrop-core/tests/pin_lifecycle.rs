use pindrop_core::{
    Controller, Coordinate, FlowState, Geocoder, JsonFileStorage, NominatimClient, Pin, PinStore,
    Viewport, LOOKUP_FAILED,
};
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

struct FixedGeocoder(&'static str);

impl Geocoder for FixedGeocoder {
    fn resolve_address(&self, _at: Coordinate) -> String {
        self.0.to_string()
    }
}

fn open(path: &Path) -> Controller {
    Controller::new(
        PinStore::load(Box::new(JsonFileStorage::new(path))),
        Viewport::default(),
    )
}

/// Click, submit and run the lookup inline.
fn drop_pin(controller: &mut Controller, geocoder: &dyn Geocoder, lat: f64, lng: f64, remark: &str) {
    controller.click(Coordinate::new(lat, lng).unwrap());
    let ticket = controller.submit(remark).expect("pending pin");
    let address = geocoder.resolve_address(ticket.at);
    controller.resolved(ticket.id, address).expect("committed pin");
}

#[test]
fn test_cafe_scenario_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");

    let mut controller = open(&path);
    drop_pin(&mut controller, &FixedGeocoder("10 Downing St"), 51.505, -0.09, "Cafe");

    let expected = vec![Pin {
        lat: 51.505,
        lng: -0.09,
        remark: "Cafe".to_string(),
        address: "10 Downing St".to_string(),
    }];
    assert_eq!(controller.pins(), expected.as_slice());
    assert_eq!(controller.flow(), &FlowState::Idle);

    let reopened = open(&path);
    assert_eq!(reopened.pins(), expected.as_slice());
}

#[test]
fn test_geocode_failure_still_commits_pin() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/reverse", listener.local_addr().unwrap());
    drop(listener);
    let geocoder = NominatimClient::new(endpoint, "PinDropApp/1.0", Duration::from_secs(2)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut controller = open(&dir.path().join("pins.json"));
    drop_pin(&mut controller, &geocoder, 48.8584, 2.2945, "Tower");

    let last = controller.pins().last().unwrap();
    assert_eq!(last.remark, "Tower");
    assert_eq!(last.address, LOOKUP_FAILED);
}

#[test]
fn test_select_then_clear_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");
    let geocoder = FixedGeocoder("somewhere");

    let mut controller = open(&path);
    drop_pin(&mut controller, &geocoder, 10.0, 10.0, "one");
    drop_pin(&mut controller, &geocoder, 20.0, -30.0, "two");
    drop_pin(&mut controller, &geocoder, 30.0, 40.0, "three");

    let mut controller = open(&path);
    assert_eq!(controller.pins().len(), 3);

    assert!(controller.select(1));
    assert_eq!(controller.viewport().center, Coordinate::new(20.0, -30.0).unwrap());
    assert_eq!(controller.highlighted(), Some(1));

    controller.clear_pins();
    assert!(controller.pins().is_empty());
    assert_eq!(controller.highlighted(), None);
    assert!(open(&path).pins().is_empty());
}

#[test]
fn test_corrupt_slot_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");
    std::fs::write(&path, "this is not json").unwrap();

    let mut controller = open(&path);
    assert!(controller.pins().is_empty());

    drop_pin(&mut controller, &FixedGeocoder("addr"), 1.0, 2.0, "");
    assert_eq!(open(&path).pins().len(), 1);
}
