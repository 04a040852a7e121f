//! Custom-scheme deep links (`<scheme>://<host>[?insecure=true]`)

use super::migration_service::strip_trailing_slash;
use super::ServerRegistry;
use crate::error::{CoreResult, ValidationFailure};
use crate::traits::Dialogs;
use crate::types::AddHostOutcome;

/// Extract the host url from a deep-link uri.
///
/// Resolves to `https://<host>`, or `http://<host>` when the uri carries
/// `insecure=true`. Returns `None` for other schemes or an empty host.
pub fn parse_deep_link(scheme: &str, uri: &str) -> Option<String> {
    let prefix = format!("{scheme}://");
    if !uri.starts_with(&prefix) {
        return None;
    }

    // "<scheme>:" / "" / "<host>" / ...
    let site = uri.split(['/', '?']).nth(2).filter(|s| !s.is_empty())?;
    let transport = if uri.contains("insecure=true") {
        "http://"
    } else {
        "https://"
    };
    Some(format!("{transport}{site}"))
}

/// Find a deep link among process launch arguments.
///
/// The first argument is the executable itself, so a single argument never
/// carries a link.
pub fn protocol_url_from_args(scheme: &str, args: &[String]) -> Option<String> {
    if args.len() <= 1 {
        return None;
    }
    let prefix = format!("{scheme}://");
    args.iter()
        .find(|arg| arg.starts_with(&prefix))
        .and_then(|arg| parse_deep_link(scheme, arg))
}

/// How an inbound add-host request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLinkOutcome {
    /// Host already known and now active
    Activated(String),
    /// Host confirmed, validated, added and activated
    Added(String),
    /// User declined the confirmation
    Declined,
    Invalid {
        url: String,
        failure: ValidationFailure,
    },
}

/// Handle an `add-host(url)` request from the OS or a launch argument.
///
/// The url is compared without its trailing slash, the same way the
/// registry stores it.
pub async fn handle_add_host_request(
    registry: &ServerRegistry,
    dialogs: &dyn Dialogs,
    url: &str,
) -> CoreResult<DeepLinkOutcome> {
    let url = strip_trailing_slash(url.trim());
    if registry.host_exists(url).await {
        registry.set_active(url).await;
        return Ok(DeepLinkOutcome::Activated(url.to_string()));
    }

    if !dialogs.confirm_add_host(url).await {
        log::info!("Add host {url} declined");
        return Ok(DeepLinkOutcome::Declined);
    }

    if let Err(failure) = registry.validate_host(url, None).await {
        log::warn!("Deep-linked host {url} failed validation: {failure}");
        dialogs.report_invalid_host(url).await;
        return Ok(DeepLinkOutcome::Invalid {
            url: url.to_string(),
            failure,
        });
    }

    let outcome = registry.add_host(url).await?;
    registry.set_active(outcome.url()).await;
    Ok(match outcome {
        AddHostOutcome::Added(url) => DeepLinkOutcome::Added(url),
        AddHostOutcome::Existing(url) => DeepLinkOutcome::Activated(url),
    })
}
