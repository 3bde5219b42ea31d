mod support;

use core::cell::RefCell;
use std::rc::Rc;

use exchange::config::{ACCEPT_HTML, FORM_CONTENT_TYPE};
use exchange::{EventSource, Outcome};
use support::{Harness, ScriptedBackend};

const LINKS_PAGE: &str = r##"<html><body>
  <div class="card" id="create-card">
    <form id="create" hx-post="/admin/links" hx-target="closest .card" hx-swap="outerHTML"
          data-success-event="refresh-links">
      <input name="slug" value="docs">
      <input name="target" value="https://docs.example">
      <button id="save" name="intent" value="save">Save</button>
    </form>
  </div>
  <div id="links-table" hx-get="/admin/links/table" hx-target="#links-table"><p id="stale">stale</p></div>
  <button id="del" hx-delete="/admin/links/7" hx-target="#row-7" hx-swap="outerHTML"
          hx-confirm="Delete this link?" data-success-event="refresh-links">Delete</button>
  <table><tbody><tr id="row-7"><td>docs</td></tr></tbody></table>
</body></html>"##;

#[tokio::test]
async fn outer_swap_replaces_closest_card_and_fires_success_once() {
    let backend = ScriptedBackend::new();
    backend.reply("POST /admin/links", 200, r#"<div class="card" id="fresh">Created</div>"#);
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");

    let form = harness.el("create");
    let dispatch = harness.page.submit(form, None).await;

    assert!(dispatch.default_prevented);
    assert_eq!(
        dispatch.outcome,
        Outcome::Completed {
            status: 200,
            swapped: true
        }
    );
    assert!(harness.find("create-card").is_none());
    assert!(harness.find("create").is_none());
    assert_eq!(harness.text("fresh"), "Created");
    assert_eq!(*refreshes.borrow(), 1);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.as_str(), "https://admin.example/admin/links");
    assert_eq!(requests[0].header("HX-Request"), Some("true"));
    assert_eq!(requests[0].header("Accept"), Some(ACCEPT_HTML));
    assert_eq!(requests[0].header("Content-Type"), Some(FORM_CONTENT_TYPE));
    assert_eq!(
        requests[0].body.as_deref(),
        Some("slug=docs&target=https%3A%2F%2Fdocs.example")
    );
}

#[tokio::test]
async fn empty_outer_response_removes_target() {
    let backend = ScriptedBackend::new();
    backend.reply("DELETE /admin/links/7", 200, "  \n ");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));

    let button = harness.el("del");
    let dispatch = harness.page.click(button).await;

    assert_eq!(
        dispatch.outcome,
        Outcome::Completed {
            status: 200,
            swapped: true
        }
    );
    assert!(harness.find("row-7").is_none());
    assert_eq!(harness.prompt.asked(), vec!["Delete this link?".to_owned()]);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let backend = ScriptedBackend::new();
    let harness = Harness::boot_with(LINKS_PAGE, Rc::clone(&backend), false, None);
    let refreshes = harness.count_event("refresh-links");
    let before = harness.inner_html("row-7");

    let button = harness.el("del");
    let dispatch = harness.page.click(button).await;

    assert!(!dispatch.default_prevented);
    assert_eq!(dispatch.outcome, Outcome::Declined);
    assert!(backend.requests().is_empty());
    assert_eq!(harness.inner_html("row-7"), before);
    assert_eq!(*refreshes.borrow(), 0);
}

#[tokio::test]
async fn overlapping_submits_send_one_request() {
    let backend = ScriptedBackend::yielding();
    backend.reply("POST /admin/links", 200, r#"<div class="card">Created</div>"#);
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");

    let form = harness.el("create");
    let (first, second) = futures::join!(
        harness.page.submit(form, None),
        harness.page.submit(form, None)
    );

    assert!(matches!(first.outcome, Outcome::Completed { .. }));
    assert_eq!(second.outcome, Outcome::Busy);
    assert!(second.default_prevented);
    assert_eq!(backend.routes(), vec!["POST /admin/links".to_owned()]);
    assert_eq!(*refreshes.borrow(), 1);
    assert!(!harness.page.is_busy(form));
}

#[tokio::test]
async fn form_is_released_after_failure() {
    let backend = ScriptedBackend::new();
    backend.fail("POST /admin/links");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));

    let form = harness.el("create");
    let first = harness.page.submit(form, None).await;
    assert_eq!(first.outcome, Outcome::Failed { status: None });
    assert!(!harness.page.is_busy(form));

    harness.page.submit(form, None).await;
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn network_failure_shows_notice_without_success() {
    let backend = ScriptedBackend::new();
    backend.fail("POST /admin/links");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");

    let form = harness.el("create");
    harness.page.submit(form, None).await;

    assert_eq!(harness.text("create-card"), "请求失败，请稍后再试");
    assert_eq!(*refreshes.borrow(), 0);
}

#[tokio::test]
async fn error_status_shows_notice_in_target() {
    let backend = ScriptedBackend::new();
    backend.reply("GET /admin/links/table", 500, "<p>boom</p>");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));

    let stale = harness.el("stale");
    let dispatch = harness.page.click(stale).await;

    assert_eq!(dispatch.outcome, Outcome::Failed { status: Some(500) });
    assert_eq!(harness.inner_html("links-table"), "请求失败，请稍后再试");
}

#[tokio::test]
async fn get_trigger_swaps_inner_without_success_event() {
    let backend = ScriptedBackend::new();
    backend.reply("GET /admin/links/table", 200, "<p id=\"fresh\">fresh</p>");
    let markup = r##"<body>
      <div id="links-table" hx-get="/admin/links/table" hx-target="#links-table"
           data-success-event="refresh-links">
        <p id="stale">stale</p>
      </div></body>"##;
    let harness = Harness::boot(markup, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");

    let stale = harness.el("stale");
    harness.page.click(stale).await;

    assert_eq!(harness.inner_html("links-table"), r#"<p id="fresh">fresh</p>"#);
    assert_eq!(*refreshes.borrow(), 0);
    let requests = backend.requests();
    assert_eq!(requests[0].body, None);
    assert_eq!(requests[0].header("Content-Type"), None);
}

#[tokio::test]
async fn submitter_name_is_appended() {
    let backend = ScriptedBackend::new();
    backend.reply("POST /admin/links", 200, "<div class=\"card\">ok</div>");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));

    let save = harness.el("save");
    let dispatch = harness.page.click(save).await;

    assert!(matches!(dispatch.outcome, Outcome::Completed { .. }));
    assert_eq!(
        backend.requests()[0].body.as_deref(),
        Some("slug=docs&target=https%3A%2F%2Fdocs.example&intent=save")
    );
}

#[tokio::test]
async fn submitter_does_not_override_form_field() {
    let backend = ScriptedBackend::new();
    let markup = r#"<body><form id="f" hx-put="/admin/settings">
        <input name="intent" value="typed">
        <button id="go" name="intent" value="button">Go</button></form></body>"#;
    let harness = Harness::boot(markup, Rc::clone(&backend));

    let form = harness.el("f");
    let go = harness.el("go");
    harness.page.submit(form, Some(go)).await;

    let requests = backend.requests();
    assert_eq!(requests[0].method.as_str(), "PUT");
    assert_eq!(requests[0].body.as_deref(), Some("intent=typed"));
}

#[tokio::test]
async fn form_without_declared_request_is_ignored() {
    let backend = ScriptedBackend::new();
    let harness = Harness::boot(
        r#"<body><form id="plain" action="/login"><button id="b">Go</button></form></body>"#,
        Rc::clone(&backend),
    );

    let button = harness.el("b");
    let form = harness.el("plain");
    let clicked = harness.page.click(button).await;
    let submitted = harness.page.submit(form, None).await;

    assert_eq!(clicked.outcome, Outcome::Ignored);
    assert!(!clicked.default_prevented);
    assert_eq!(submitted.outcome, Outcome::Ignored);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn reset_on_success_clears_form() {
    let backend = ScriptedBackend::new();
    backend.reply("POST /admin/subdomains", 200, "<span id=\"msg\">saved</span>");
    let markup = r##"<body><div id="status"></div>
      <form id="f" hx-post="/admin/subdomains" hx-target="#status" data-reset-on-success="true"
            data-success-event="refresh-subdomains">
        <input id="name" name="name" value="">
      </form></body>"##;
    let harness = Harness::boot(markup, Rc::clone(&backend));
    let events: Rc<RefCell<Vec<EventSource>>> = Rc::default();
    let sink = Rc::clone(&events);
    harness
        .page
        .add_event_listener("refresh-subdomains", move |event| sink.borrow_mut().push(event.source));

    let name = harness.el("name");
    harness.page.input(name, "blog");
    let form = harness.el("f");
    harness.page.submit(form, None).await;

    assert_eq!(backend.requests()[0].body.as_deref(), Some("name=blog"));
    assert_eq!(harness.page.document().value(name), "");
    assert_eq!(harness.text("msg"), "saved");
    assert_eq!(*events.borrow(), vec![EventSource::CustomEvent]);
}

#[tokio::test]
async fn domain_field_is_recomputed_before_submit() {
    let backend = ScriptedBackend::new();
    let markup = r#"<body><form id="f" hx-post="/admin/subdomains">
        <div data-domain-input data-domain-suffix="example.com">
          <input id="prefix" data-domain-input-field value="">
          <input type="hidden" name="domain" data-domain-input-hidden>
        </div></form></body>"#;
    let harness = Harness::boot(markup, Rc::clone(&backend));

    let prefix = harness.el("prefix");
    harness.page.document_mut().set_value(prefix, "  Blog ");
    let form = harness.el("f");
    harness.page.submit(form, None).await;

    assert_eq!(
        backend.requests()[0].body.as_deref(),
        Some("domain=blog.example.com")
    );
}

#[tokio::test]
async fn authorization_comes_from_body_attribute() {
    let backend = ScriptedBackend::new();
    let markup = r#"<body data-auth-header="Bearer abc123">
        <div id="t" hx-get="/admin/links/count"></div></body>"#;
    let harness = Harness::boot(markup, Rc::clone(&backend));

    let trigger = harness.el("t");
    harness.page.click(trigger).await;

    assert_eq!(
        backend.requests()[0].header("Authorization"),
        Some("Bearer abc123")
    );
}

#[tokio::test]
async fn no_authorization_without_credential() {
    let backend = ScriptedBackend::new();
    let harness = Harness::boot(
        r#"<body data-auth-header=""><div id="t" hx-get="/x"></div></body>"#,
        Rc::clone(&backend),
    );

    let trigger = harness.el("t");
    harness.page.click(trigger).await;

    assert_eq!(backend.requests()[0].header("Authorization"), None);
}

#[tokio::test]
async fn delete_wins_over_get_on_same_element() {
    let backend = ScriptedBackend::new();
    let harness = Harness::boot(
        r#"<body><button id="b" hx-get="/a" hx-delete="/b">x</button></body>"#,
        Rc::clone(&backend),
    );

    let button = harness.el("b");
    harness.page.click(button).await;

    assert_eq!(backend.routes(), vec!["DELETE /b".to_owned()]);
}

#[tokio::test]
async fn missing_target_still_runs_success() {
    let backend = ScriptedBackend::new();
    backend.reply("DELETE /admin/links/9", 200, "");
    let harness = Harness::boot(
        r##"<body><button id="b" hx-delete="/admin/links/9" hx-target="#gone"
              data-success-event="refresh-links">x</button></body>"##,
        Rc::clone(&backend),
    );
    let refreshes = harness.count_event("refresh-links");

    let button = harness.el("b");
    let dispatch = harness.page.click(button).await;

    assert_eq!(
        dispatch.outcome,
        Outcome::Completed {
            status: 200,
            swapped: false
        }
    );
    assert_eq!(*refreshes.borrow(), 1);
}

#[tokio::test]
async fn swapped_in_content_is_enhanced() {
    let backend = ScriptedBackend::new();
    backend.reply(
        "GET /admin/links/table",
        200,
        r#"<button id="copy" data-copy-value="https://s.example/docs">Copy</button>"#,
    );
    let harness = Harness::boot(
        r##"<body><div id="links-table" hx-get="/admin/links/table" hx-target="#links-table"></div></body>"##,
        Rc::clone(&backend),
    );

    let table = harness.el("links-table");
    harness.page.click(table).await;

    let copy = harness.el("copy");
    assert_eq!(
        harness.page.document().attr(copy, "data-copy-bound"),
        Some("true")
    );
    // The copy button sits inside the table trigger, which still runs.
    let dispatch = harness.page.click(copy).await;
    assert!(dispatch.default_prevented);
    assert_eq!(
        dispatch.outcome,
        Outcome::Completed {
            status: 200,
            swapped: true
        }
    );
    assert_eq!(backend.routes().len(), 2);
}

#[tokio::test]
async fn copy_button_inside_form_does_not_submit() {
    let backend = ScriptedBackend::new();
    let harness = Harness::boot(
        r#"<body><form id="create" hx-post="/admin/links">
             <input name="slug" value="docs">
             <button id="copy" data-copy-value="docs">Copy</button>
           </form></body>"#,
        Rc::clone(&backend),
    );

    let dispatch = harness.page.click(harness.el("copy")).await;

    assert!(dispatch.default_prevented);
    assert_eq!(dispatch.outcome, Outcome::Enhanced);
    assert!(backend.routes().iter().all(|route| !route.starts_with("POST")));
}

#[tokio::test]
async fn untyped_delete_button_in_form_is_a_trigger() {
    let backend = ScriptedBackend::new();
    backend.reply("DELETE /admin/links/7", 200, "");
    backend.reply("POST /admin/links", 200, "<p>saved</p>");
    let harness = Harness::boot(
        r#"<body><form id="edit" hx-post="/admin/links">
             <input name="slug" value="docs">
             <button id="del" hx-delete="/admin/links/7" hx-confirm="Delete this link?">Delete</button>
             <button id="save" type="submit" hx-delete="/admin/links/8">Save</button>
           </form></body>"#,
        Rc::clone(&backend),
    );

    let dispatch = harness.page.click(harness.el("del")).await;
    assert!(matches!(dispatch.outcome, Outcome::Completed { .. }));
    assert_eq!(harness.prompt.asked(), vec!["Delete this link?".to_owned()]);

    // An explicit submit control submits its form.
    harness.page.click(harness.el("save")).await;
    assert_eq!(
        backend.routes(),
        vec!["DELETE /admin/links/7".to_owned(), "POST /admin/links".to_owned()]
    );
}

#[tokio::test]
async fn overlapping_triggers_are_not_deduplicated() {
    let backend = ScriptedBackend::yielding();
    backend.reply("GET /admin/links/table", 200, "<p>fresh</p>");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));

    let table = harness.el("links-table");
    let (first, second) = futures::join!(harness.page.click(table), harness.page.click(table));

    assert!(matches!(first.outcome, Outcome::Completed { .. }));
    assert!(matches!(second.outcome, Outcome::Completed { .. }));
    assert_eq!(
        backend.routes(),
        vec![
            "GET /admin/links/table".to_owned(),
            "GET /admin/links/table".to_owned()
        ]
    );
}

#[tokio::test]
async fn failed_submit_fires_no_success_event() {
    let backend = ScriptedBackend::new();
    backend.reply("POST /admin/links", 500, "<p>boom</p>");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");

    let dispatch = harness.page.submit(harness.el("create"), None).await;

    assert_eq!(dispatch.outcome, Outcome::Failed { status: Some(500) });
    assert_eq!(harness.text("create-card"), harness.page.config().failure_notice);
    assert_eq!(*refreshes.borrow(), 0);
}

#[tokio::test]
async fn target_detached_in_flight_is_skipped() {
    let backend = ScriptedBackend::yielding();
    backend.reply("DELETE /admin/links/7", 200, "");
    let harness = Harness::boot(LINKS_PAGE, Rc::clone(&backend));
    let refreshes = harness.count_event("refresh-links");
    let row = harness.el("row-7");

    let (dispatch, ()) = futures::join!(harness.page.click(harness.el("del")), async {
        harness.page.document_mut().remove(row);
    });

    assert_eq!(
        dispatch.outcome,
        Outcome::Completed {
            status: 200,
            swapped: false
        }
    );
    assert!(harness.find("row-7").is_none());
    assert_eq!(*refreshes.borrow(), 1);
}
