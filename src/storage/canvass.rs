//! Loading a canvass from a [`Repository`].

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use uuid::Uuid;

use crate::{
    domain::{CanvassResult, Config, DataShapeError, compute_canvass},
    storage::Repository,
};

/// Errors raised while loading a canvass.
#[derive(Debug, thiserror::Error)]
pub enum CanvassError {
    /// A request could not be fetched. No partial canvass is produced.
    #[error("failed to fetch request {request_id}")]
    Fetch {
        /// The request whose fetch failed.
        request_id: Uuid,
        /// The repository's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The fetched requests do not have the expected shape.
    #[error(transparent)]
    DataShape(#[from] DataShapeError),
}

fn fetch_error<E>(request_id: Uuid) -> impl FnOnce(E) -> CanvassError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| CanvassError::Fetch {
        request_id,
        source: Box::new(e),
    }
}

/// Fetches an order and its pending quotations and compares them.
///
/// Quotations are fetched concurrently. The first failed fetch fails the
/// whole canvass.
///
/// # Errors
///
/// Returns [`CanvassError::Fetch`] if the order, the quotation list or any
/// quotation cannot be fetched, and [`CanvassError::DataShape`] if the
/// requests are malformed.
pub fn load_canvass<R: Repository>(
    repository: &R,
    order_id: Uuid,
    config: &Config,
) -> Result<CanvassResult, CanvassError> {
    let order = repository
        .fetch_request_with_responses(order_id)
        .map_err(fetch_error(order_id))?;
    let quotation_ids = repository
        .fetch_sibling_quotations(order_id)
        .map_err(fetch_error(order_id))?;

    tracing::debug!(order = %order_id, quotations = quotation_ids.len(), "loading canvass");

    let quotations = quotation_ids
        .par_iter()
        .map(|&id| {
            repository
                .fetch_request_with_responses(id)
                .map_err(fetch_error(id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(compute_canvass(&order, &quotations, config)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::{
        Form, Request, RequestEvent, Response, TransitionCommand,
        canvass::tests::{order_with_items, quotation},
    };

    #[derive(Debug, thiserror::Error)]
    #[error("request unavailable")]
    struct Unavailable;

    /// Serves requests from memory. Ids listed in `failing` error on fetch.
    #[derive(Default)]
    struct InMemory {
        requests: HashMap<Uuid, Request>,
        siblings: Vec<Uuid>,
        failing: Vec<Uuid>,
    }

    impl Repository for InMemory {
        type Error = Unavailable;

        fn fetch_form(&self, _form_id: Uuid) -> Result<Form, Unavailable> {
            Err(Unavailable)
        }

        fn fetch_request_with_responses(&self, request_id: Uuid) -> Result<Request, Unavailable> {
            if self.failing.contains(&request_id) {
                return Err(Unavailable);
            }
            self.requests.get(&request_id).cloned().ok_or(Unavailable)
        }

        fn fetch_sibling_quotations(
            &self,
            _parent_order_id: Uuid,
        ) -> Result<Vec<Uuid>, Unavailable> {
            Ok(self.siblings.clone())
        }

        fn fetch_responses_for_request(
            &self,
            request_id: Uuid,
            _field_names: Option<&[&str]>,
        ) -> Result<Vec<Response>, Unavailable> {
            Ok(self.fetch_request_with_responses(request_id)?.responses)
        }

        fn transition_request_status(
            &self,
            _command: &TransitionCommand,
        ) -> Result<RequestEvent, Unavailable> {
            Err(Unavailable)
        }

        fn cancel_request(
            &self,
            _request_id: Uuid,
            _actor_id: Uuid,
        ) -> Result<RequestEvent, Unavailable> {
            Err(Unavailable)
        }

        fn delete_request(&self, _request_id: Uuid) -> Result<RequestEvent, Unavailable> {
            Err(Unavailable)
        }
    }

    fn setup() -> (InMemory, Uuid, Vec<Uuid>) {
        let order = order_with_items(&[("Cement", 10.0, "bags")]);
        let label = "Cement (10 bags)";
        let a = quotation(&order, &[(label, 20.0, 10.0)], &[("Delivery Fee", 30.0)]);
        let b = quotation(&order, &[(label, 45.0, 10.0)], &[("Delivery Fee", 1000.0)]);
        let order_id = order.id;
        let ids = vec![a.id, b.id];
        let repository = InMemory {
            siblings: ids.clone(),
            requests: [order, a, b].into_iter().map(|r| (r.id, r)).collect(),
            failing: Vec::new(),
        };
        (repository, order_id, ids)
    }

    #[test]
    fn canvass_is_computed_over_fetched_quotations() {
        let (repository, order_id, ids) = setup();

        let canvass = load_canvass(&repository, order_id, &Config::default()).unwrap();

        assert_eq!(canvass.quotations.len(), 2);
        assert_eq!(canvass.recommended.map(|r| r.quotation_id), Some(ids[0]));
    }

    #[test]
    fn one_failed_fetch_fails_the_canvass() {
        let (mut repository, order_id, ids) = setup();
        repository.failing.push(ids[1]);

        let error = load_canvass(&repository, order_id, &Config::default()).unwrap_err();

        assert!(matches!(error, CanvassError::Fetch { request_id, .. } if request_id == ids[1]));
    }

    #[test]
    fn missing_order_is_a_fetch_error() {
        let (repository, _, _) = setup();
        let missing = Uuid::new_v4();

        let error = load_canvass(&repository, missing, &Config::default()).unwrap_err();

        assert!(matches!(error, CanvassError::Fetch { request_id, .. } if request_id == missing));
    }
}
