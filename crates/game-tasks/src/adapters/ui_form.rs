//! UI form opening, keyed by the serial id the UI host assigns.

use crate::adapters::{operation_failed, route};
use crate::domain::{Completion, CompletionRegistry, OpenUiFormRequest};
use crate::error::TaskError;
use crate::ports::UiHost;
use shared_bus::events::{OpenUiFormFailure, OpenUiFormSuccess};
use shared_bus::{SubscriptionRegistry, SubscriptionScope};
use shared_types::{SerialId, UiForm};
use std::sync::Arc;

const OPEN_UI_FORM: &str = "open ui form";

pub struct UiFormTasks {
    host: Arc<dyn UiHost>,
    opens: Arc<CompletionRegistry<SerialId, UiForm>>,
}

impl UiFormTasks {
    pub fn new(host: Arc<dyn UiHost>) -> Self {
        Self {
            host,
            opens: Arc::new(CompletionRegistry::new(OPEN_UI_FORM)),
        }
    }

    pub fn registry(&self) -> &CompletionRegistry<SerialId, UiForm> {
        &self.opens
    }

    /// Open a form. Every call opens a new form instance; the host's serial
    /// id correlates the result.
    pub fn open_ui_form_async(&self, request: OpenUiFormRequest) -> Completion<UiForm> {
        let host = &self.host;
        self.opens
            .start_then_register(|| host.open_ui_form(&request))
    }

    pub fn install(
        &self,
        subscriptions: &SubscriptionRegistry,
        scope: &SubscriptionScope,
    ) -> Result<(), TaskError> {
        let opens = Arc::clone(&self.opens);
        route(subscriptions, scope, move |event: &OpenUiFormSuccess| {
            opens.resolve_success(&event.ui_form.serial_id, event.ui_form.clone());
        })?;

        let opens = Arc::clone(&self.opens);
        route(subscriptions, scope, move |event: &OpenUiFormFailure| {
            opens.resolve_failure(
                &event.serial_id,
                operation_failed(OPEN_UI_FORM, event.serial_id, &event.error_message),
            );
        })
    }
}
