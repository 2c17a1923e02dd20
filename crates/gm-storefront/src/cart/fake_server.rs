//! An in-process `/cart` API for tests, keyed by product and type_name.

use gm_data::testing::MockTransport;
use gm_data::{Method, Request, Response};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type Row = (u64, Option<String>, u32);
pub(crate) type Rows = Rc<RefCell<Vec<Row>>>;

pub(crate) fn row(product_id: u64, type_name: Option<&str>, quantity: u32) -> Row {
    (product_id, type_name.map(str::to_string), quantity)
}

fn type_name(body: &Value) -> Option<String> {
    body["type_name"].as_str().map(str::to_string)
}

/// Route GET, add, update and remove on `mock` to a shared row list.
pub(crate) fn serve_cart(mock: &MockTransport) -> Rows {
    let rows: Rows = Rc::new(RefCell::new(Vec::new()));

    let r = rows.clone();
    mock.route(Method::Get, "/cart", move |_| {
        let body: Vec<Value> = r
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, (pid, t, qty))| {
                json!({
                    "id": i + 1, "user_id": 1, "product_id": pid,
                    "quantity": qty, "type_name": t
                })
            })
            .collect();
        Response::with_json(200, &body)
    });

    let r = rows.clone();
    mock.route(Method::Post, "/cart/add", move |req: &Request| {
        let body: Value = req.json()?;
        let pid = body["product_id"].as_u64().unwrap_or(0);
        let qty = body["quantity"].as_u64().unwrap_or(1) as u32;
        let t = type_name(&body);
        let mut rows = r.borrow_mut();
        match rows.iter_mut().find(|(p, rt, _)| *p == pid && *rt == t) {
            Some(row) => row.2 += qty,
            None => rows.push((pid, t, qty)),
        }
        Response::with_json(200, &json!({"message": "Added to cart"}))
    });

    let r = rows.clone();
    mock.route(Method::Post, "/cart/update", move |req: &Request| {
        let body: Value = req.json()?;
        let pid = body["product_id"].as_u64().unwrap_or(0);
        let delta = body["delta"].as_i64().unwrap_or(0);
        let t = type_name(&body);
        if let Some(row) = r
            .borrow_mut()
            .iter_mut()
            .find(|(p, rt, _)| *p == pid && *rt == t)
        {
            row.2 = (i64::from(row.2) + delta).max(1) as u32;
        }
        Response::with_json(200, &json!({"message": "Updated"}))
    });

    let r = rows.clone();
    mock.route(Method::Delete, "/cart/remove/{id}", move |req: &Request| {
        let pid: u64 = req
            .path()
            .rsplit('/')
            .next()
            .unwrap_or("")
            .parse()
            .unwrap_or(0);
        let t = type_name(&req.json::<Value>()?);
        r.borrow_mut().retain(|(p, rt, _)| !(*p == pid && *rt == t));
        Response::with_json(200, &json!({"message": "Removed"}))
    });

    rows
}
