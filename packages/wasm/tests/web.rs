//! Browser smoke tests for the JavaScript facade.
//!
//! Run with `wasm-pack test --headless --chrome packages/wasm`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Reflect};
use packet_dag_wasm::PacketDagWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn quiet_config() -> JsValue {
    let config = js_sys::Object::new();
    for (key, value) in [
        ("initialPeers", 3.0),
        ("skipProbability", 0.0),
        ("arrivalJitterMs", 0.0),
        ("tickIntervalMs", 100.0),
        ("seed", 42.0),
    ] {
        Reflect::set(&config, &key.into(), &value.into()).unwrap();
    }
    config.into()
}

#[wasm_bindgen_test]
fn default_config_round_trips() {
    let view = PacketDagWasm::new(JsValue::UNDEFINED).map_err(JsValue::from).unwrap();
    let config = view.config().map_err(JsValue::from).unwrap();
    let window = Reflect::get(&config, &"windowRounds".into()).unwrap();
    assert_eq!(window.as_f64(), Some(20.0));
    assert_eq!(view.peer_count(), 5);
}

#[wasm_bindgen_test]
fn tick_layout_and_buffers() {
    let mut view = PacketDagWasm::new(quiet_config()).map_err(JsValue::from).unwrap();
    assert_eq!(view.tick(0.0), 3);
    assert_eq!(view.tick(100.0), 3);

    let frame = view.layout().map_err(JsValue::from).unwrap();
    let placed = Array::from(&Reflect::get(&frame, &"placed".into()).unwrap());
    assert_eq!(placed.length(), 6);

    assert_eq!(view.positions().length(), 12);
    assert_eq!(view.edge_segments().length(), 9 * 4);
    assert_eq!(view.get_bounds().map(|b| b.len()), Some(4));
}

#[wasm_bindgen_test]
fn extent_callback_receives_number() {
    let mut view = PacketDagWasm::new(quiet_config()).map_err(JsValue::from).unwrap();
    let callback = Function::new_with_args("extent", "globalThis.__lastExtent = extent;");
    view.set_extent_callback(Some(callback));

    view.tick(0.0);
    view.tick(100.0);
    view.layout().map_err(JsValue::from).unwrap();

    let seen = Reflect::get(&js_sys::global(), &"__lastExtent".into()).unwrap();
    assert_eq!(seen.as_f64(), Some(0.5));
}

#[wasm_bindgen_test]
fn peers_by_label() {
    let mut view = PacketDagWasm::new(quiet_config()).map_err(JsValue::from).unwrap();
    let label = view.add_peer();
    assert_eq!(view.peer_count(), 4);
    assert!(view.peers().contains(&label));
    assert!(view.remove_peer(&label));
    assert!(!view.remove_peer("not hex"));
    assert_eq!(view.peer_count(), 3);
}

#[wasm_bindgen_test]
fn set_config_rejects_garbage() {
    let mut view = PacketDagWasm::new(JsValue::NULL).map_err(JsValue::from).unwrap();
    assert!(view.set_config(JsValue::from_str("nope")).is_err());
}
