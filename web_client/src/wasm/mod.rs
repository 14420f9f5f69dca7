mod banner;
mod bridge;
mod dom;
mod logging;

use std::rc::Rc;

use ajax_core::{AjaxApp, AppConfig, HttpTransport, Interceptor, PageParts, TableContainer};
use tracing::{debug, info, warn};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlFormElement, SubmitEvent};

use banner::{DomBannerView, WindowTimers};
use dom::{DomHost, DomTableContainer, FormSnapshot, SubmissionRegistry};

/// Element holding the page's JSON configuration overrides.
const CONFIG_SCRIPT_ID: &str = "ajax-config";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let inline = document
        .get_element_by_id(CONFIG_SCRIPT_ID)
        .and_then(|script| script.text_content());
    let config = AppConfig::load_with(inline.as_deref()).map_err(js_error)?;
    logging::init_tracing(&config.logging);

    let base_url = Url::parse(&window.location().href()?).map_err(js_error)?;
    let registry = Rc::new(SubmissionRegistry::default());

    let container = document.get_element_by_id(&config.scheduler.container_id);
    let table_container = container
        .clone()
        .map(|element| Rc::new(DomTableContainer::new(element)) as Rc<dyn TableContainer>);

    let parts = PageParts {
        host: Rc::new(DomHost::new(window.clone(), Rc::clone(&registry))),
        transport: Rc::new(HttpTransport::new().with_base_url(base_url)),
        timers: Rc::new(WindowTimers::new(window.clone())),
        banner_view: Rc::new(DomBannerView::new(
            document.clone(),
            config.interceptor.banner_element_id.clone(),
        )),
        scheduler_banner_view: Rc::new(
            DomBannerView::new(document.clone(), config.scheduler.banner_element_id.clone())
                .near(container),
        ),
        table_container,
    };

    let app = AjaxApp::new(config, parts);
    bridge::install(&app.bus, Rc::clone(&registry));
    install_submit_listener(&document, Rc::clone(&app.interceptor), registry)?;

    info!(
        scheduler = app.scheduler.is_some(),
        "AJAX form interception active"
    );
    Ok(())
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One capture-phase listener on the document sees every form submission,
/// including forms added after start-up.
fn install_submit_listener(
    document: &Document,
    interceptor: Rc<Interceptor>,
    registry: Rc<SubmissionRegistry>,
) -> Result<(), JsValue> {
    let listener = Closure::<dyn FnMut(SubmitEvent)>::new(move |event: SubmitEvent| {
        on_submit(&interceptor, &registry, event);
    });
    document.add_event_listener_with_callback_and_bool(
        "submit",
        listener.as_ref().unchecked_ref(),
        true,
    )?;
    // Lives for the rest of the page.
    listener.forget();
    Ok(())
}

fn on_submit(interceptor: &Rc<Interceptor>, registry: &Rc<SubmissionRegistry>, event: SubmitEvent) {
    if event.default_prevented() {
        return;
    }
    let Some(element) = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };

    let submitter = event.submitter();
    let snapshot = match FormSnapshot::capture(&element, submitter.as_ref()) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            debug!("Dialog form left to the browser");
            return;
        }
        Err(e) => {
            warn!("Could not read form, falling back to native submit: {:?}", e);
            return;
        }
    };

    if !interceptor.accepts(snapshot.form()) {
        debug!(action = %snapshot.form().action, "Form opted out of interception");
        return;
    }

    event.prevent_default();

    let id = snapshot.form().id;
    registry.insert(id, element, submitter);

    let interceptor = Rc::clone(interceptor);
    let registry = Rc::clone(registry);
    spawn_local(async move {
        let form = snapshot.resolve().await;
        interceptor.submit(form).await;
        registry.remove(id);
    });
}
