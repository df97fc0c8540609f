use mmschema::schema::SchemaKind;
use mmschema::tests_utils::Fixture;
use mmtype::{OperationDecl, TypeDecl, TypeForm, TypeTags};

#[test]
fn self_referential_managed_types_terminate() {
    let fixture = Fixture::new();
    let node = fixture.universe.reserve();
    fixture.universe.register_reserved(
        node,
        TypeDecl::new("Node", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Value", fixture.int))
            .with_operation(OperationDecl::setter("Value", fixture.int))
            .with_operation(OperationDecl::getter("Parent", node)),
    );

    let schema = fixture
        .store()
        .schema_for(&fixture.universe, node)
        .unwrap();
    assert_eq!(schema.kind, SchemaKind::Managed);
    let parent = schema.property("parent").unwrap();
    assert_eq!(parent.ty, node);
    assert!(!parent.writable);
}

#[test]
fn mutually_referential_managed_types_terminate() {
    let fixture = Fixture::new();
    let parent = fixture.universe.reserve();
    let child = fixture.universe.reserve();
    fixture.universe.register_reserved(
        parent,
        TypeDecl::new("Parent", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Child", child)),
    );
    fixture.universe.register_reserved(
        child,
        TypeDecl::new("Child", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Parent", parent)),
    );

    let store = fixture.store();
    let schema = store.schema_for(&fixture.universe, parent).unwrap();
    assert_eq!(schema.property("child").unwrap().ty, child);

    // Both schemas were published on the way out of the recursion.
    assert!(store.get(child).is_some());
    assert_eq!(
        store.get(child).unwrap().property("parent").unwrap().ty,
        parent
    );
}

#[test]
fn writable_cyclic_properties_are_accepted() {
    let fixture = Fixture::new();
    let node = fixture.universe.reserve();
    fixture.universe.register_reserved(
        node,
        TypeDecl::new("Node", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Next", node))
            .with_operation(OperationDecl::setter("Next", node)),
    );

    let schema = fixture
        .store()
        .schema_for(&fixture.universe, node)
        .unwrap();
    assert!(schema.property("next").unwrap().writable);
}

#[test]
fn defects_behind_a_cycle_still_fail_the_root() {
    let fixture = Fixture::new();
    let parent = fixture.universe.reserve();
    let child = fixture.universe.reserve();
    fixture.universe.register_reserved(
        parent,
        TypeDecl::new("Parent", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Child", child)),
    );
    // The child half of the cycle carries a non-accessor operation.
    fixture.universe.register_reserved(
        child,
        TypeDecl::new("Child", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Parent", parent))
            .with_operation(OperationDecl::new("reset", None)),
    );

    let store = fixture.store();
    let error = store
        .schema_for(&fixture.universe, parent)
        .unwrap_err();
    assert!(error.is_unpaired_operations());
    assert!(store.get(parent).is_none());
    assert!(store.get(child).is_none());
}

#[test]
fn concurrent_extraction_of_a_cyclic_pair_completes() {
    let fixture = Fixture::new();
    let parent = fixture.universe.reserve();
    let child = fixture.universe.reserve();
    fixture.universe.register_reserved(
        parent,
        TypeDecl::new("Parent", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Child", child)),
    );
    fixture.universe.register_reserved(
        child,
        TypeDecl::new("Child", TypeForm::Interface)
            .tagged(TypeTags::MANAGED)
            .with_operation(OperationDecl::getter("Parent", parent)),
    );

    // Each thread extracts one half of the cycle; repeated rounds with a
    // fresh store shake out unlucky interleavings.
    for _ in 0..32 {
        let store = fixture.store();
        std::thread::scope(|scope| {
            let left = scope.spawn(|| store.schema_for(&fixture.universe, parent));
            let right = scope.spawn(|| store.schema_for(&fixture.universe, child));
            assert!(left.join().unwrap().is_ok());
            assert!(right.join().unwrap().is_ok());
        });
        assert!(store.get(parent).is_some());
        assert!(store.get(child).is_some());
    }
}
