//! Canned [`MapsProvider`] for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::types::{GeocodeReply, WirePlace, WireRoute, WireSuggestion};
use super::{
    AutocompleteRequest, MapsProvider, NearbyRequest, ProviderError, ProviderFuture, RouteRequest,
};

#[derive(Default)]
pub struct MockProvider {
    pub geocode: Option<GeocodeReply>,
    pub places: Vec<WirePlace>,
    pub place: Option<WirePlace>,
    pub suggestions: Vec<WireSuggestion>,
    pub routes: Vec<WireRoute>,
    /// When set, every call fails with `ProviderError::Api { status, .. }`.
    pub fail_status: Option<u16>,
    pub calls: AtomicUsize,
    pub last_nearby: Mutex<Option<NearbyRequest>>,
    pub last_autocomplete: Mutex<Option<AutocompleteRequest>>,
    pub last_route: Mutex<Option<RouteRequest>>,
}

impl MockProvider {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T: Send + 'static>(&self, value: T) -> ProviderFuture<'static, T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.fail_status {
            Some(status) => Err(ProviderError::Api {
                status,
                message: "mock failure".into(),
            }),
            None => Ok(value),
        };
        Box::pin(async move { result })
    }
}

impl MapsProvider for MockProvider {
    fn geocode<'a>(&'a self, _address: &'a str) -> ProviderFuture<'a, GeocodeReply> {
        let reply = self.geocode.clone().unwrap_or(GeocodeReply {
            results: Vec::new(),
            status: "ZERO_RESULTS".into(),
            error_message: None,
        });
        self.answer(reply)
    }

    fn search_text<'a>(&'a self, _query: &'a str) -> ProviderFuture<'a, Vec<WirePlace>> {
        self.answer(self.places.clone())
    }

    fn search_nearby<'a>(
        &'a self,
        request: &'a NearbyRequest,
    ) -> ProviderFuture<'a, Vec<WirePlace>> {
        *self.last_nearby.lock().unwrap() = Some(request.clone());
        self.answer(self.places.clone())
    }

    fn autocomplete<'a>(
        &'a self,
        request: &'a AutocompleteRequest,
    ) -> ProviderFuture<'a, Vec<WireSuggestion>> {
        *self.last_autocomplete.lock().unwrap() = Some(request.clone());
        self.answer(self.suggestions.clone())
    }

    fn get_place<'a>(&'a self, _place_id: &'a str) -> ProviderFuture<'a, WirePlace> {
        self.answer(self.place.clone().unwrap_or_default())
    }

    fn compute_routes<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, Vec<WireRoute>> {
        *self.last_route.lock().unwrap() = Some(request.clone());
        self.answer(self.routes.clone())
    }
}
