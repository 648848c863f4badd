//=========================================================================
// Request Tracking
//=========================================================================
//
// Bookkeeping for the service requests a scene has in flight.
//
// Architecture:
//   SceneController::service_request()
//     ├─ RequestTracker::begin()     allocate an id
//     ├─ RequestService::request()   may complete synchronously
//     └─ RequestTracker::register()  unless it already completed
//
//   TrackedRequest::cancel()      cancel + deregister
//   RequestTracker::cancel_all()  scene cleanup, untracked cancels only
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::services::{RequestHandle, RequestOptions, RequestService, ServiceResponse};

//=== RequestTracker ======================================================

#[derive(Default)]
pub struct RequestTracker {
    next_id: Cell<u64>,
    active: RefCell<Vec<(u64, RequestHandle)>>,
    issuing: Cell<Option<u64>>,
    finished_while_issuing: Cell<bool>,
}

impl RequestTracker {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Issues a request through `service` and tracks it until it completes
    /// (non-subscriptions only), is cancelled, or is removed.
    pub fn issue(
        self: &Rc<Self>,
        service: &dyn RequestService,
        url: &str,
        mut options: RequestOptions,
        resubscribe: bool,
    ) -> TrackedRequest {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        options.resubscribe = resubscribe;

        if !options.subscribe {
            let tracker = Rc::downgrade(self);
            let user = options.on_complete.take();
            options.on_complete = Some(Rc::new(move |response: &ServiceResponse| {
                if let Some(user) = &user {
                    user(response);
                }
                if let Some(tracker) = tracker.upgrade() {
                    tracker.finish(id);
                }
            }));
        }

        self.issuing.set(Some(id));
        self.finished_while_issuing.set(false);
        let handle = service.request(url, options);
        self.issuing.set(None);

        if self.finished_while_issuing.replace(false) {
            debug!(target: "scene", "Request {} to {} completed synchronously", id, url);
        } else {
            self.active.borrow_mut().push((id, Rc::clone(&handle)));
        }

        TrackedRequest {
            id,
            handle,
            tracker: Rc::downgrade(self),
        }
    }

    /// Forgets request `id`; returns whether it was still tracked.
    pub fn remove(&self, id: u64) -> bool {
        let mut active = self.active.borrow_mut();
        match active.iter().position(|(tracked, _)| *tracked == id) {
            Some(index) => {
                active.remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancels every tracked request through its own handle and forgets
    /// them all.
    pub fn cancel_all(&self) -> usize {
        let outstanding = std::mem::take(&mut *self.active.borrow_mut());
        for (_, handle) in &outstanding {
            handle.cancel();
        }
        outstanding.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    fn finish(&self, id: u64) {
        if self.issuing.get() == Some(id) {
            self.finished_while_issuing.set(true);
        } else {
            self.remove(id);
        }
    }
}

//=== TrackedRequest ======================================================

/// A request issued on behalf of a scene.
#[derive(Clone)]
pub struct TrackedRequest {
    id: u64,
    handle: RequestHandle,
    tracker: Weak<RequestTracker>,
}

impl TrackedRequest {
    /// Cancels the request and stops tracking it.
    pub fn cancel(&self) {
        self.handle.cancel();
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.remove(self.id);
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_tracked(&self) -> bool {
        self.tracker
            .upgrade()
            .is_some_and(|tracker| tracker.active.borrow().iter().any(|(id, _)| *id == self.id))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::ServiceRequest;

    #[derive(Default)]
    struct FakeRequest {
        cancelled: Cell<u32>,
    }

    impl ServiceRequest for FakeRequest {
        fn cancel(&self) {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }

    /// Keeps every issued request and its completion callback.
    #[derive(Default)]
    struct FakeService {
        synchronous: bool,
        issued: RefCell<Vec<(Rc<FakeRequest>, RequestOptions)>>,
    }

    impl RequestService for FakeService {
        fn request(&self, _url: &str, options: RequestOptions) -> RequestHandle {
            let request = Rc::new(FakeRequest::default());
            if self.synchronous {
                if let Some(done) = &options.on_complete {
                    done(&ServiceResponse::Success(None));
                }
            }
            self.issued.borrow_mut().push((Rc::clone(&request), options));
            request
        }
    }

    impl FakeService {
        fn complete(&self, index: usize) {
            let callback = self.issued.borrow()[index].1.on_complete.clone();
            if let Some(callback) = callback {
                callback(&ServiceResponse::Success(None));
            }
        }
    }

    #[test]
    fn completion_deregisters_plain_requests() {
        let tracker = RequestTracker::new();
        let service = FakeService::default();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);

        let request = tracker.issue(
            &service,
            "palm://com.palm.systemservice",
            RequestOptions::method("getTime").on_complete(move |_| sink.set(sink.get() + 1)),
            false,
        );
        assert!(request.is_tracked());

        service.complete(0);
        assert_eq!(hits.get(), 1);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn synchronous_completion_is_never_tracked() {
        let tracker = RequestTracker::new();
        let service = FakeService {
            synchronous: true,
            ..FakeService::default()
        };

        let request = tracker.issue(&service, "palm://sync", RequestOptions::method("get"), false);
        assert!(!request.is_tracked());
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn subscriptions_stay_tracked_and_resubscribe_is_forwarded() {
        let tracker = RequestTracker::new();
        let service = FakeService::default();

        tracker.issue(&service, "palm://status", RequestOptions::method("watch").subscribed(), true);
        service.complete(0);

        assert_eq!(tracker.active_count(), 1);
        assert!(service.issued.borrow()[0].1.resubscribe);
    }

    #[test]
    fn cancel_deregisters_and_cancel_all_cancels_once() {
        let tracker = RequestTracker::new();
        let service = FakeService::default();

        let first = tracker.issue(&service, "palm://a", RequestOptions::method("a"), false);
        tracker.issue(&service, "palm://b", RequestOptions::method("b"), false);
        tracker.issue(&service, "palm://c", RequestOptions::method("c").subscribed(), false);

        first.cancel();
        assert_eq!(tracker.active_count(), 2);
        assert_eq!(service.issued.borrow()[0].0.cancelled.get(), 1);

        assert_eq!(tracker.cancel_all(), 2);
        assert_eq!(tracker.active_count(), 0);
        let issued = service.issued.borrow();
        assert_eq!(issued[1].0.cancelled.get(), 1);
        assert_eq!(issued[2].0.cancelled.get(), 1);
    }
}
