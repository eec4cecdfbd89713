//! Specialization gate.
//!
//! Decides whether the mount namespace action is scheduled for a request
//! and records that decision in the host-owned mount-external flag, so a
//! second hook invocation on the same request cannot trigger it again.

use unshare_common::types::Uid;

use crate::identity::Classifier;

/// The host's in-flight specialization request, borrowed for one pre-hook.
#[derive(Debug)]
pub struct SpecializationRequest<'a> {
    /// Identity the child will run as.
    pub uid: Uid,
    /// Host-owned flag: `0` means the namespace action is not yet scheduled.
    pub mount_external: &'a mut i32,
    /// Name the child should report itself as, if the host supplied one.
    pub display_name: Option<&'a str>,
    /// Whether this request creates a nested spawner instead of an app.
    pub is_child_spawner: bool,
}

impl<'a> SpecializationRequest<'a> {
    /// Creates a request for an ordinary (non-spawner) specialization.
    pub const fn new(uid: Uid, mount_external: &'a mut i32, display_name: Option<&'a str>) -> Self {
        Self {
            uid,
            mount_external,
            display_name,
            is_child_spawner: false,
        }
    }

    /// Marks the request as creating a nested spawner.
    #[must_use]
    pub const fn child_spawner(mut self, is_child_spawner: bool) -> Self {
        self.is_child_spawner = is_child_spawner;
        self
    }
}

/// Returns `true` exactly once per request for eligible identities, setting
/// the mount-external flag to `1` as it does.
///
/// System identities return `false` without touching the flag.
pub fn should_unshare(classifier: &Classifier, request: &mut SpecializationRequest<'_>) -> bool {
    if classifier.should_skip_uid(request.uid) {
        tracing::trace!(uid = %request.uid, "ineligible identity, not unsharing");
        return false;
    }
    if *request.mount_external != 0 {
        tracing::debug!(
            uid = %request.uid,
            mount_external = *request.mount_external,
            "unshare already scheduled for this request"
        );
        return false;
    }
    *request.mount_external = 1;
    true
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn first_call_schedules_second_does_not() {
        let classifier = Classifier::default();
        let mut flag = 0;
        let mut request = SpecializationRequest::new(Uid::new(10_234), &mut flag, Some("app"));
        assert!(should_unshare(&classifier, &mut request));
        assert_eq!(*request.mount_external, 1);
        assert!(!should_unshare(&classifier, &mut request));
        assert_eq!(flag, 1);
    }

    #[test]
    fn system_uid_leaves_flag_untouched() {
        let classifier = Classifier::default();
        let mut flag = 0;
        let mut request = SpecializationRequest::new(Uid::new(1000), &mut flag, None);
        assert!(!should_unshare(&classifier, &mut request));
        assert_eq!(flag, 0);
    }

    #[test]
    fn preset_flag_is_respected() {
        let classifier = Classifier::default();
        let mut flag = 3;
        let mut request = SpecializationRequest::new(Uid::new(10_234), &mut flag, None);
        assert!(!should_unshare(&classifier, &mut request));
        assert_eq!(flag, 3);
    }

    proptest! {
        #[test]
        fn system_range_never_mutates(
            user in 0u32..40_000,
            app_id in prop_oneof![0u32..10_000, 20_000u32..90_000],
            initial in any::<i32>(),
        ) {
            let classifier = Classifier::default();
            let mut flag = initial;
            let mut request =
                SpecializationRequest::new(Uid::new(user * 100_000 + app_id), &mut flag, None);
            prop_assert!(!should_unshare(&classifier, &mut request));
            prop_assert_eq!(flag, initial);
        }

        #[test]
        fn eligible_range_triggers_exactly_once(
            user in 0u32..40_000,
            app_id in prop_oneof![10_000u32..20_000, 90_000u32..100_000],
        ) {
            let classifier = Classifier::default();
            let mut flag = 0;
            let mut request =
                SpecializationRequest::new(Uid::new(user * 100_000 + app_id), &mut flag, None);
            prop_assert!(should_unshare(&classifier, &mut request));
            prop_assert!(!should_unshare(&classifier, &mut request));
            prop_assert_eq!(flag, 1);
        }
    }
}
