use mmschema::walker::{ExclusionRules, collect_operations};
use mmtype::{OperationDecl, OperationTags, TypeDecl, TypeForm, TypeUniverse, Visibility};

#[test]
fn diamond_interfaces_contribute_operations_once() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let base = universe.register(
        TypeDecl::new("Identified", TypeForm::Interface)
            .with_operation(OperationDecl::getter("Id", int)),
    );
    let left = universe.register(TypeDecl::new("Left", TypeForm::Interface).implementing([base]));
    let right = universe.register(TypeDecl::new("Right", TypeForm::Interface).implementing([base]));
    let diamond = universe.register(
        TypeDecl::new("Diamond", TypeForm::Interface).implementing([left, right]),
    );

    let operations = collect_operations(&universe, diamond, &ExclusionRules::none());
    let id_getters = operations.iter().filter(|op| op.name == "getId").count();
    assert_eq!(id_getters, 1);
}

#[test]
fn own_operations_come_before_inherited_ones() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let parent = universe.register(
        TypeDecl::new("Parent", TypeForm::AbstractClass)
            .with_operation(OperationDecl::getter("Inherited", int)),
    );
    let child = universe.register(
        TypeDecl::new("Child", TypeForm::AbstractClass)
            .extending(parent)
            .with_operation(OperationDecl::getter("Own", int)),
    );

    let operations = collect_operations(&universe, child, &ExclusionRules::none());
    let names: Vec<&str> = operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, ["getOwn", "getInherited"]);
}

#[test]
fn ignore_root_operations_are_excluded_from_classes() {
    let universe = TypeUniverse::new([0; 6]);
    let string = universe.register(TypeDecl::new("String", TypeForm::ConcreteClass));
    let root = universe.register(
        TypeDecl::new("ObjectRoot", TypeForm::ConcreteClass)
            .with_operation(OperationDecl::getter("Description", string).concrete()),
    );
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    // The class overrides a root operation; the override is equivalent to
    // the root's and must be dropped along with the root level itself.
    let subject = universe.register(
        TypeDecl::new("Subject", TypeForm::ConcreteClass)
            .extending(root)
            .with_operation(OperationDecl::getter("Description", string).concrete())
            .with_operation(OperationDecl::getter("Size", int).concrete()),
    );

    let rules = ExclusionRules::new(&universe, [root]);
    let operations = collect_operations(&universe, subject, &rules);
    let names: Vec<&str> = operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, ["getSize"]);
}

#[test]
fn root_equivalence_does_not_apply_to_interfaces() {
    let universe = TypeUniverse::new([0; 6]);
    let string = universe.register(TypeDecl::new("String", TypeForm::ConcreteClass));
    let root = universe.register(
        TypeDecl::new("ObjectRoot", TypeForm::ConcreteClass)
            .with_operation(OperationDecl::getter("Description", string).concrete()),
    );
    let contract = universe.register(
        TypeDecl::new("Describable", TypeForm::Interface)
            .with_operation(OperationDecl::getter("Description", string)),
    );

    let rules = ExclusionRules::new(&universe, [root]);
    let operations = collect_operations(&universe, contract, &rules);
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].name, "getDescription");
}

#[test]
fn ignore_tagged_operations_are_always_excluded() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let contract = universe.register(
        TypeDecl::new("Contract", TypeForm::Interface)
            .with_operation(OperationDecl::getter("Kept", int))
            .with_operation(OperationDecl::getter("Skipped", int).tagged(OperationTags::IGNORE)),
    );

    let operations = collect_operations(&universe, contract, &ExclusionRules::none());
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].name, "getKept");
}

#[test]
fn synthetic_operations_are_excluded_from_classes_only() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let class = universe.register(
        TypeDecl::new("Impl", TypeForm::ConcreteClass)
            .with_operation(OperationDecl::getter("Value", int).concrete().synthetic()),
    );
    let interface = universe.register(
        TypeDecl::new("Bridge", TypeForm::Interface)
            .with_operation(OperationDecl::getter("Value", int).synthetic()),
    );

    assert!(collect_operations(&universe, class, &ExclusionRules::none()).is_empty());
    assert_eq!(
        collect_operations(&universe, interface, &ExclusionRules::none()).len(),
        1
    );
}

#[test]
fn non_public_operations_are_not_collected() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let class = universe.register(
        TypeDecl::new("Impl", TypeForm::ConcreteClass).with_operation(
            OperationDecl::getter("Hidden", int)
                .concrete()
                .with_visibility(Visibility::Private),
        ),
    );

    assert!(collect_operations(&universe, class, &ExclusionRules::none()).is_empty());
}

#[test]
fn cyclic_superclass_chains_terminate() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let first = universe.reserve();
    let second = universe.reserve();
    universe.register_reserved(
        first,
        TypeDecl::new("First", TypeForm::AbstractClass)
            .extending(second)
            .with_operation(OperationDecl::getter("Left", int)),
    );
    universe.register_reserved(
        second,
        TypeDecl::new("Second", TypeForm::AbstractClass)
            .extending(first)
            .with_operation(OperationDecl::getter("Right", int)),
    );

    let operations = collect_operations(&universe, first, &ExclusionRules::none());
    let names: Vec<&str> = operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, ["getLeft", "getRight"]);
}
