//! Integration tests for the RBAC service layer.
//!
//! Tests: RoleService / UserService → in-memory repositories → EventBus
//!
//! Verifies:
//! - Role assignment keeps only usable roles and replaces the previous set
//! - Permission resolution unions and deduplicates across roles
//! - Soft delete hides records from listings without erasing them
//! - Argument errors fire before any storage access

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, mpsc};
    use std::time::Duration;

    use gatekeeper_core::{PermissionId, RoleId, UserId};
    use gatekeeper_events::{EventBus, InMemoryBusError, InMemoryEventBus, Subscription};
    use gatekeeper_rbac::{
        Admin, AdminAttributes, AdminRepository, BatchWhere, Columns, DeletedState, EnableState, Page,
        PageRequest, PasswordHasher, PasswordPolicy, Permission, Query, RepositoryResult, Role,
        RoleAttributes, RoleService, UserRoleChanged, UserService,
    };
    use serde_json::json;

    use crate::bootstrap::{InMemoryStores, Services};
    use crate::config::InfraConfig;
    use crate::password::Argon2PasswordHasher;

    type Bus = Arc<InMemoryEventBus<UserRoleChanged>>;

    struct Harness {
        stores: InMemoryStores,
        services: Services<Bus>,
        bus: Bus,
    }

    fn setup() -> Harness {
        gatekeeper_observability::init();
        let stores = InMemoryStores::new();
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let services = Services::in_memory(&InfraConfig::default(), &stores, bus.clone());

        for (id, path) in [(1, "/roles"), (2, "/users"), (3, "/permissions"), (9, "*")] {
            stores
                .permissions
                .insert(Permission::new(PermissionId::new(id), path.trim_start_matches('/'), path))
                .unwrap();
        }

        Harness { stores, services, bus }
    }

    fn role(h: &Harness, name: &str, state: EnableState) -> Role {
        h.services
            .roles
            .create(RoleAttributes::named(name).with_state(state))
            .unwrap()
    }

    fn deleted_role(h: &Harness, name: &str) -> Role {
        let role = role(h, name, EnableState::Enabled);
        assert!(h.services.roles.delete(role.id).unwrap());
        role
    }

    fn admin(h: &Harness, name: &str) -> Admin {
        h.services
            .users
            .create(AdminAttributes::new(name, "s3cret-pw"))
            .unwrap()
    }

    fn linked_role_ids(h: &Harness, user_id: UserId) -> Vec<RoleId> {
        h.services
            .users
            .get_role_by_user_id(user_id)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    fn paths(permissions: &[Permission]) -> Vec<&str> {
        permissions.iter().map(|p| p.path.as_str()).collect()
    }

    /// Counts every call that reaches the wrapped admin repository.
    struct CountingAdmins {
        inner: Arc<dyn AdminRepository>,
        calls: AtomicUsize,
    }

    impl CountingAdmins {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AdminRepository for CountingAdmins {
        fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>> {
            self.hit();
            self.inner.find(id)
        }

        fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>> {
            self.hit();
            self.inner.paginate(query, page)
        }

        fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin> {
            self.hit();
            self.inner.create(attributes)
        }

        fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>> {
            self.hit();
            self.inner.update(id, attributes)
        }

        fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64> {
            self.hit();
            self.inner.update_where(query, attributes)
        }

        fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool> {
            self.hit();
            self.inner.allot_role(user_id, role_ids)
        }

        fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool> {
            self.hit();
            self.inner.clear_role_by_user_id(user_id)
        }

        fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>> {
            self.hit();
            self.inner.get_role_collection_by_user_id(user_id)
        }
    }

    /// A bus whose broker is always down.
    struct FailingBus;

    impl EventBus<UserRoleChanged> for FailingBus {
        type Error = InMemoryBusError;

        fn publish(&self, _message: UserRoleChanged) -> Result<(), Self::Error> {
            Err(InMemoryBusError::Poisoned)
        }

        fn subscribe(&self) -> Subscription<UserRoleChanged> {
            let (_tx, rx) = mpsc::channel();
            Subscription::new(rx)
        }
    }

    fn user_service_with<B: EventBus<UserRoleChanged>>(
        stores: &InMemoryStores,
        admins: Arc<dyn AdminRepository>,
        bus: B,
    ) -> UserService<B> {
        let roles = Arc::new(RoleService::new(
            stores.roles.clone(),
            stores.role_permissions.clone(),
            stores.permissions.clone(),
        ));
        UserService::new(
            admins,
            roles,
            Arc::new(Argon2PasswordHasher::new()),
            PasswordPolicy::default(),
            bus,
        )
    }

    // ---- role assignment ------------------------------------------------

    #[test]
    fn allot_role_with_unset_user_fails_without_touching_storage() {
        let stores = InMemoryStores::new();
        let counting = Arc::new(CountingAdmins {
            inner: stores.admins.clone(),
            calls: AtomicUsize::new(0),
        });
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let users = user_service_with(&stores, counting.clone(), bus.clone());
        let sub = bus.subscribe();

        let err = users
            .allot_role(UserId::default(), &[RoleId::new(1)])
            .unwrap_err();

        assert!(err.is_argument());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn allot_role_persists_only_usable_roles_and_publishes_once() {
        let h = setup();
        let user = admin(&h, "alice");
        let enabled = role(&h, "editor", EnableState::Enabled);
        let disabled = role(&h, "auditor", EnableState::Disabled);
        let deleted = deleted_role(&h, "legacy");
        let sub = h.bus.subscribe();

        let status = h
            .services
            .users
            .allot_role(user.id, &[enabled.id, disabled.id, deleted.id, RoleId::new(404)])
            .unwrap();

        assert!(status);
        assert_eq!(linked_role_ids(&h, user.id), vec![enabled.id]);

        let event = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(event.admin.id, user.id);
        assert!(event.admin.password.is_empty());
        assert_eq!(event.role_ids, vec![enabled.id]);
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn allot_role_replaces_rather_than_unions() {
        let h = setup();
        let user = admin(&h, "bob");
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);
        let c = role(&h, "c", EnableState::Enabled);

        h.services.users.allot_role(user.id, &[a.id, b.id]).unwrap();
        h.services.users.allot_role(user.id, &[c.id]).unwrap();

        assert_eq!(linked_role_ids(&h, user.id), vec![c.id]);
    }

    #[test]
    fn allot_role_with_only_unusable_roles_clears_assignment() {
        let h = setup();
        let user = admin(&h, "carol");
        let a = role(&h, "a", EnableState::Enabled);
        let disabled = role(&h, "off", EnableState::Disabled);
        h.services.users.allot_role(user.id, &[a.id]).unwrap();

        assert!(h.services.users.allot_role(user.id, &[disabled.id]).unwrap());
        assert!(linked_role_ids(&h, user.id).is_empty());
    }

    #[test]
    fn allot_role_for_unknown_user_is_not_found() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        let err = h
            .services
            .users
            .allot_role(UserId::new(77), &[a.id])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn publish_failure_does_not_fail_assignment() {
        let stores = InMemoryStores::new();
        let users = user_service_with(&stores, stores.admins.clone(), FailingBus);
        let user = users.create(AdminAttributes::new("dave", "s3cret-pw")).unwrap();
        let roles = RoleService::new(
            stores.roles.clone(),
            stores.role_permissions.clone(),
            stores.permissions.clone(),
        );
        let r = roles.create(RoleAttributes::named("ops")).unwrap();

        assert!(users.allot_role(user.id, &[r.id]).unwrap());
        assert_eq!(stores.admins.role_ids_of(user.id).unwrap(), vec![r.id]);
    }

    #[test]
    fn delete_by_user_id_with_unset_id_is_a_no_op() {
        let h = setup();
        let user = admin(&h, "erin");
        let a = role(&h, "a", EnableState::Enabled);
        h.services.users.allot_role(user.id, &[a.id]).unwrap();

        assert!(!h.services.users.delete_by_user_id(UserId::default()).unwrap());
        assert_eq!(linked_role_ids(&h, user.id), vec![a.id]);
    }

    #[test]
    fn delete_by_user_id_clears_all_links() {
        let h = setup();
        let user = admin(&h, "frank");
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);
        h.services.users.allot_role(user.id, &[a.id, b.id]).unwrap();

        assert!(h.services.users.delete_by_user_id(user.id).unwrap());
        assert!(linked_role_ids(&h, user.id).is_empty());
        // Clearing an already empty set still succeeds.
        assert!(h.services.users.delete_by_user_id(user.id).unwrap());
    }

    #[test]
    fn linked_roles_are_returned_even_after_they_are_disabled() {
        let h = setup();
        let user = admin(&h, "gina");
        let a = role(&h, "a", EnableState::Enabled);
        h.services.users.allot_role(user.id, &[a.id]).unwrap();

        h.services
            .roles
            .update(RoleAttributes::default().with_state(EnableState::Disabled), a.id)
            .unwrap();

        let roles = h.services.users.get_role_by_user_id(user.id).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].state, EnableState::Disabled);
    }

    // ---- permission resolution --------------------------------------------

    #[test]
    fn permissions_are_unioned_and_deduplicated() {
        let h = setup();
        let user = admin(&h, "hank");
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);
        h.services
            .roles
            .allot_permission(a.id, &[PermissionId::new(1), PermissionId::new(2)])
            .unwrap();
        h.services
            .roles
            .allot_permission(b.id, &[PermissionId::new(2), PermissionId::new(3)])
            .unwrap();
        h.services.users.allot_role(user.id, &[a.id, b.id]).unwrap();

        let granted = h.services.users.get_permission_by_user_id(user.id).unwrap();
        assert_eq!(paths(&granted), vec!["/roles", "/users", "/permissions"]);
    }

    #[test]
    fn user_without_roles_has_no_permissions() {
        let h = setup();
        let user = admin(&h, "ivy");
        assert!(h.services.users.get_permission_by_user_id(user.id).unwrap().is_empty());
        assert!(!h.services.users.check_permission(user.id, "/roles").unwrap());
    }

    #[test]
    fn raw_resolution_ignores_role_state_but_effective_does_not() {
        let h = setup();
        let user = admin(&h, "jack");
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);
        h.services.roles.allot_permission(a.id, &[PermissionId::new(1)]).unwrap();
        h.services.roles.allot_permission(b.id, &[PermissionId::new(2)]).unwrap();
        h.services.users.allot_role(user.id, &[a.id, b.id]).unwrap();

        h.services
            .roles
            .update(RoleAttributes::default().with_state(EnableState::Disabled), b.id)
            .unwrap();

        let raw = h.services.users.get_permission_by_user_id(user.id).unwrap();
        let effective = h
            .services
            .users
            .get_effective_permission_by_user_id(user.id)
            .unwrap();
        assert_eq!(paths(&raw), vec!["/roles", "/users"]);
        assert_eq!(paths(&effective), vec!["/roles"]);
    }

    #[test]
    fn check_and_explain_use_effective_permissions() {
        let h = setup();
        let user = admin(&h, "kim");
        let root = role(&h, "root", EnableState::Enabled);
        h.services.roles.allot_permission(root.id, &[PermissionId::new(9)]).unwrap();
        h.services.users.allot_role(user.id, &[root.id]).unwrap();

        assert!(h.services.users.check_permission(user.id, "/anything").unwrap());

        let explanation = h.services.users.explain_permission(user.id, "/anything").unwrap();
        assert!(explanation.granted);
        assert!(explanation.has_wildcard);

        h.services.roles.delete(root.id).unwrap();
        assert!(!h.services.users.check_permission(user.id, "/anything").unwrap());
    }

    // ---- role store ---------------------------------------------------------

    #[test]
    fn soft_deleted_role_stays_retrievable_but_leaves_listings() {
        let h = setup();
        let keep = role(&h, "keep", EnableState::Enabled);
        let gone = deleted_role(&h, "gone");

        let found = h.services.roles.find(gone.id, &Columns::All).unwrap().unwrap();
        assert_eq!(found.is_deleted, DeletedState::Deleted);

        let page = h
            .services
            .roles
            .paginate(PageRequest::default(), None, &Columns::All)
            .unwrap();
        let ids: Vec<RoleId> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep.id]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn delete_of_unknown_role_reports_false() {
        let h = setup();
        assert!(!h.services.roles.delete(RoleId::new(999)).unwrap());
    }

    #[test]
    fn paginate_filters_by_state_and_name_fragment() {
        let h = setup();
        role(&h, "billing-admin", EnableState::Enabled);
        role(&h, "billing-viewer", EnableState::Disabled);
        role(&h, "support", EnableState::Enabled);

        let page = h
            .services
            .roles
            .paginate(PageRequest::default(), Some("billing"), &Columns::All)
            .unwrap();
        let names: Vec<&str> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["billing-admin"]);

        let blank = h
            .services
            .roles
            .paginate(PageRequest::default(), Some("  "), &Columns::All)
            .unwrap();
        assert_eq!(blank.total, 2);
    }

    #[test]
    fn role_names_are_required_and_unique_among_live_roles() {
        let h = setup();
        role(&h, "ops", EnableState::Enabled);

        assert!(h.services.roles.create(RoleAttributes::named("  ")).unwrap_err().is_validation());
        assert!(h.services.roles.create(RoleAttributes::named("ops")).unwrap_err().is_validation());

        let old = deleted_role(&h, "reused");
        let fresh = h.services.roles.create(RoleAttributes::named("reused")).unwrap();
        assert_ne!(old.id, fresh.id);
    }

    #[test]
    fn role_update_requires_existing_id() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        role(&h, "b", EnableState::Enabled);

        let err = h
            .services
            .roles
            .update(RoleAttributes::named("x"), RoleId::default())
            .unwrap_err();
        assert!(err.is_argument());

        let err = h
            .services
            .roles
            .update(RoleAttributes::named("x"), RoleId::new(500))
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(h.services.roles.update(RoleAttributes::named("b"), a.id).unwrap_err().is_validation());
        let renamed = h.services.roles.update(RoleAttributes::named(" a2 "), a.id).unwrap();
        assert_eq!(renamed.name, "a2");
    }

    fn live_role_names(h: &Harness) -> Vec<String> {
        h.services
            .roles
            .paginate(PageRequest::default(), None, &Columns::All)
            .unwrap()
            .items
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    #[test]
    fn restoring_a_role_rechecks_its_name() {
        let h = setup();
        let old = deleted_role(&h, "ops");
        role(&h, "ops", EnableState::Enabled);

        let restore = RoleAttributes::default().with_deleted(DeletedState::NotDeleted);
        let err = h.services.roles.update(restore.clone(), old.id).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(live_role_names(&h), vec!["ops"]);

        let renamed_restore = RoleAttributes::named("ops-legacy").with_deleted(DeletedState::NotDeleted);
        let restored = h.services.roles.update(renamed_restore, old.id).unwrap();
        assert!(restored.is_normality());
        assert_eq!(live_role_names(&h), vec!["ops-legacy", "ops"]);
    }

    #[test]
    fn batch_update_cannot_share_one_name_across_roles() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);

        let err = h
            .services
            .roles
            .batch_update(RoleAttributes::named("same"), &BatchWhere::ids([a.id, b.id]))
            .unwrap_err();
        assert!(err.is_argument());
        assert_eq!(live_role_names(&h), vec!["a", "b"]);

        let err = h
            .services
            .roles
            .batch_update(RoleAttributes::named("b"), &BatchWhere::ids([a.id]))
            .unwrap_err();
        assert!(err.is_validation());

        let affected = h
            .services
            .roles
            .batch_update(RoleAttributes::named("a2"), &BatchWhere::ids([a.id]))
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(live_role_names(&h), vec!["a2", "b"]);
    }

    #[test]
    fn batch_restore_over_a_live_name_is_rejected() {
        let h = setup();
        let old = deleted_role(&h, "ops");
        role(&h, "ops", EnableState::Enabled);

        let restore = RoleAttributes::default().with_deleted(DeletedState::NotDeleted);
        assert!(h.services.roles.batch_update(restore, &BatchWhere::ids([old.id])).is_err());
        assert_eq!(live_role_names(&h), vec!["ops"]);
    }

    #[test]
    fn batch_update_without_ids_fails_before_any_update() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        let disable = RoleAttributes::default().with_state(EnableState::Disabled);

        for condition in [
            BatchWhere::from_value(json!({})).unwrap(),
            BatchWhere::from_value(json!({ "id_arr": [] })).unwrap(),
        ] {
            let err = h.services.roles.batch_update(disable.clone(), &condition).unwrap_err();
            assert!(err.is_argument());
        }

        let still = h.services.roles.find(a.id, &Columns::All).unwrap().unwrap();
        assert_eq!(still.state, EnableState::Enabled);
    }

    #[test]
    fn batch_update_touches_listed_roles_only() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        let b = role(&h, "b", EnableState::Enabled);
        let c = role(&h, "c", EnableState::Enabled);

        let affected = h
            .services
            .roles
            .batch_update(
                RoleAttributes::default().with_state(EnableState::Disabled),
                &BatchWhere::ids([a.id, c.id]),
            )
            .unwrap();

        assert_eq!(affected, 2);
        let states: Vec<EnableState> = h
            .services
            .roles
            .get_role_collection_by_id_arr(&[a.id, b.id, c.id], &Columns::All)
            .unwrap()
            .into_iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(states, vec![EnableState::Disabled, EnableState::Enabled, EnableState::Disabled]);
    }

    #[test]
    fn role_collection_lookup_is_unfiltered_and_projected() {
        let h = setup();
        let deleted = deleted_role(&h, "x");
        let columns = Columns::only([gatekeeper_rbac::RoleColumn::Id, gatekeeper_rbac::RoleColumn::IsDeleted]);

        let roles = h
            .services
            .roles
            .get_role_collection_by_id_arr(&[deleted.id], &columns)
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].is_deleted, DeletedState::Deleted);
        assert!(roles[0].name.is_empty());

        assert!(h.services.roles.get_role_collection_by_id_arr(&[], &Columns::All).unwrap().is_empty());
    }

    #[test]
    fn allot_permission_replaces_links_and_retire_drops_them() {
        let h = setup();
        let a = role(&h, "a", EnableState::Enabled);
        h.services
            .roles
            .allot_permission(a.id, &[PermissionId::new(1), PermissionId::new(2)])
            .unwrap();
        h.services.roles.allot_permission(a.id, &[PermissionId::new(3)]).unwrap();

        assert_eq!(
            h.services.roles.get_permission_id_arr_by_role_id(a.id).unwrap(),
            vec![PermissionId::new(3)]
        );

        assert!(h.services.roles.retire(a.id).unwrap());
        assert!(h.services.roles.get_permission_id_arr_by_role_id(a.id).unwrap().is_empty());
        assert!(h.stores.role_permissions.is_empty());
    }

    #[test]
    fn allot_permission_to_unknown_role_is_not_found() {
        let h = setup();
        let err = h
            .services
            .roles
            .allot_permission(RoleId::new(12), &[PermissionId::new(1)])
            .unwrap_err();
        assert!(err.is_not_found());
    }

    // ---- admin store ----------------------------------------------------------

    #[test]
    fn admin_passwords_are_validated_and_hashed() {
        let h = setup();
        let user = admin(&h, "lena");
        assert_ne!(user.password, "s3cret-pw");
        assert!(Argon2PasswordHasher::new().verify("s3cret-pw", &user.password).unwrap());

        let short = h.services.users.create(AdminAttributes::new("mo", "abc")).unwrap_err();
        assert!(short.is_validation());

        let missing = h
            .services
            .users
            .create(AdminAttributes {
                name: Some("nora".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(missing.is_validation());
    }

    #[test]
    fn admin_update_rehashes_password_only_when_given() {
        let h = setup();
        let user = admin(&h, "oscar");

        let renamed = h
            .services
            .users
            .update(
                AdminAttributes {
                    name: Some("oscar2".to_string()),
                    ..Default::default()
                },
                user.id,
            )
            .unwrap();
        assert_eq!(renamed.password, user.password);

        let rekeyed = h
            .services
            .users
            .update(
                AdminAttributes {
                    password: Some("n3w-secret".to_string()),
                    ..Default::default()
                },
                user.id,
            )
            .unwrap();
        assert!(Argon2PasswordHasher::new().verify("n3w-secret", &rekeyed.password).unwrap());

        assert!(h.services.users.update(AdminAttributes::default(), UserId::default()).unwrap_err().is_argument());
        assert!(h.services.users.update(AdminAttributes::default(), UserId::new(88)).unwrap_err().is_not_found());
    }

    #[test]
    fn admin_listing_excludes_disabled_and_batch_update_applies_state() {
        let h = setup();
        let a = admin(&h, "pat");
        let b = admin(&h, "quinn");

        let affected = h
            .services
            .users
            .batch_update(
                AdminAttributes::default().with_state(EnableState::Disabled),
                &BatchWhere::ids([b.id.get()]),
            )
            .unwrap();
        assert_eq!(affected, 1);

        let page = h.services.users.paginate(PageRequest::default()).unwrap();
        let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a.id]);

        assert!(
            h.services
                .users
                .batch_update(AdminAttributes::default(), &BatchWhere::default())
                .unwrap_err()
                .is_argument()
        );
    }

    // ---- wiring -------------------------------------------------------------------

    #[test]
    fn page_request_uses_configured_default_size() {
        let config = InfraConfig {
            default_page_size: 40,
            ..InfraConfig::default()
        };
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let services = Services::in_memory(&config, &InMemoryStores::new(), bus);

        let page = services.page_request(None, None).unwrap();
        assert_eq!((page.page(), page.page_size()), (1, 40));
        assert!(services.page_request(Some(2), Some(0)).is_err());
    }

    #[tokio::test]
    async fn from_config_without_database_uses_in_memory_stores() {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let services = Services::from_config(&InfraConfig::default(), bus).await.unwrap();

        let role = services.roles.create(RoleAttributes::named("boot")).unwrap();
        assert_eq!(role.id, RoleId::new(1));
    }
}
