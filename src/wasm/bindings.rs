//! JavaScript bindings for the OT core types

use super::utils::to_js_error;
use crate::ot::{Cursor, TextOperation};
use crate::protocol::{decode_message, encode_message};
use crate::sync::{Client, ClientEvent};
use wasm_bindgen::prelude::*;

/// JavaScript-friendly wrapper for TextOperation
#[wasm_bindgen]
pub struct WasmTextOperation {
    inner: TextOperation,
}

#[wasm_bindgen]
impl WasmTextOperation {
    /// Create an empty operation
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: TextOperation::new(),
        }
    }

    /// Parse the JSON array form, e.g. `[5, "hi", -3]`
    #[wasm_bindgen(js_name = fromJSON)]
    pub fn from_json(json: &str) -> Result<WasmTextOperation, JsValue> {
        let inner = decode_message(json).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        encode_message(&self.inner).map_err(to_js_error)
    }

    /// Retain `n` chars; attributes are passed as a JSON object string
    #[wasm_bindgen(js_name = retain)]
    pub fn retain(&mut self, n: i32, attributes_json: Option<String>) -> Result<(), JsValue> {
        let attributes = match attributes_json {
            Some(json) => Some(serde_json::from_str(&json).map_err(|e| to_js_error(e.into()))?),
            None => None,
        };
        self.inner.try_retain(i64::from(n), attributes).map_err(to_js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = insert)]
    pub fn insert(&mut self, text: &str) {
        self.inner.insert(text);
    }

    #[wasm_bindgen(js_name = delete)]
    pub fn delete(&mut self, n: i32) -> Result<(), JsValue> {
        self.inner.try_delete(i64::from(n)).map_err(to_js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = baseLength)]
    pub fn base_length(&self) -> usize {
        self.inner.base_length()
    }

    #[wasm_bindgen(js_name = targetLength)]
    pub fn target_length(&self) -> usize {
        self.inner.target_length()
    }

    #[wasm_bindgen(js_name = isNoop)]
    pub fn is_noop(&self) -> bool {
        self.inner.is_noop()
    }

    #[wasm_bindgen(js_name = equals)]
    pub fn equals(&self, other: &WasmTextOperation) -> bool {
        self.inner.equals(&other.inner)
    }

    #[wasm_bindgen(js_name = apply)]
    pub fn apply(&self, document: &str) -> Result<String, JsValue> {
        self.inner.apply(document).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = invert)]
    pub fn invert(&self, document: &str) -> Result<WasmTextOperation, JsValue> {
        let inner = self.inner.invert(document).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = compose)]
    pub fn compose(&self, other: &WasmTextOperation) -> Result<WasmTextOperation, JsValue> {
        let inner = self.inner.compose(&other.inner).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Returns `[aPrime, bPrime]`
    #[wasm_bindgen(js_name = transform)]
    pub fn transform(&self, other: &WasmTextOperation) -> Result<js_sys::Array, JsValue> {
        let (a_prime, b_prime) =
            TextOperation::transform(&self.inner, &other.inner).map_err(to_js_error)?;

        let pair = js_sys::Array::new();
        pair.push(&JsValue::from(WasmTextOperation { inner: a_prime }));
        pair.push(&JsValue::from(WasmTextOperation { inner: b_prime }));
        Ok(pair)
    }

    #[wasm_bindgen(js_name = toString)]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        self.inner.to_string()
    }
}

impl Default for WasmTextOperation {
    fn default() -> Self {
        Self::new()
    }
}

/// JavaScript-friendly wrapper for Cursor
#[wasm_bindgen]
pub struct WasmCursor {
    inner: Cursor,
}

#[wasm_bindgen]
impl WasmCursor {
    #[wasm_bindgen(constructor)]
    pub fn new(position: usize, selection_end: usize) -> Self {
        Self {
            inner: Cursor::new(position, selection_end),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    #[wasm_bindgen(getter, js_name = selectionEnd)]
    pub fn selection_end(&self) -> usize {
        self.inner.selection_end()
    }

    /// Cursor moved through `operation`
    #[wasm_bindgen(js_name = transform)]
    pub fn transform(&self, operation: &WasmTextOperation) -> WasmCursor {
        Self {
            inner: self.inner.transform(&operation.inner),
        }
    }

    #[wasm_bindgen(js_name = equals)]
    pub fn equals(&self, other: &WasmCursor) -> bool {
        self.inner == other.inner
    }

    #[wasm_bindgen(js_name = fromJSON)]
    pub fn from_json(json: &str) -> Result<WasmCursor, JsValue> {
        let inner: Cursor = serde_json::from_str(json).map_err(|e| to_js_error(e.into()))?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> String {
        self.inner.to_json().to_string()
    }
}

/// JavaScript-friendly wrapper for the client state machine.
///
/// Each call returns the produced event as `{"send": [...]}` or
/// `{"apply": [...]}`, or `undefined` when there is nothing to do.
#[wasm_bindgen]
pub struct WasmClient {
    inner: Client,
}

#[wasm_bindgen]
impl WasmClient {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Client::new(),
        }
    }

    #[wasm_bindgen(js_name = applyClient)]
    pub fn apply_client(&mut self, operation: &WasmTextOperation) -> Result<Option<String>, JsValue> {
        let event = self
            .inner
            .apply_client(operation.inner.clone())
            .map_err(to_js_error)?;
        Ok(event.map(event_to_json))
    }

    #[wasm_bindgen(js_name = applyServer)]
    pub fn apply_server(&mut self, operation: &WasmTextOperation) -> Result<Option<String>, JsValue> {
        let event = self
            .inner
            .apply_server(operation.inner.clone())
            .map_err(to_js_error)?;
        Ok(event.map(event_to_json))
    }

    #[wasm_bindgen(js_name = serverAck)]
    pub fn server_ack(&mut self) -> Result<Option<String>, JsValue> {
        let event = self.inner.server_ack().map_err(to_js_error)?;
        Ok(event.map(event_to_json))
    }

    #[wasm_bindgen(js_name = serverRetry)]
    pub fn server_retry(&mut self) -> Result<Option<String>, JsValue> {
        let event = self.inner.server_retry().map_err(to_js_error)?;
        Ok(event.map(event_to_json))
    }

    #[wasm_bindgen(js_name = isSynchronized)]
    pub fn is_synchronized(&self) -> bool {
        self.inner.is_synchronized()
    }

    #[wasm_bindgen(js_name = isAwaitingConfirm)]
    pub fn is_awaiting_confirm(&self) -> bool {
        self.inner.is_awaiting_confirm()
    }

    #[wasm_bindgen(js_name = isAwaitingWithBuffer)]
    pub fn is_awaiting_with_buffer(&self) -> bool {
        self.inner.is_awaiting_with_buffer()
    }
}

impl Default for WasmClient {
    fn default() -> Self {
        Self::new()
    }
}

fn event_to_json(event: ClientEvent) -> String {
    let value = match event {
        ClientEvent::SendOperation(operation) => serde_json::json!({ "send": operation.to_json() }),
        ClientEvent::ApplyOperation(operation) => serde_json::json!({ "apply": operation.to_json() }),
    };
    value.to_string()
}
