use mmtype::{
    ConstructorDescriptor, OperationDecl, TypeDecl, TypeForm, TypeUniverse,
};

#[test]
fn registered_types_are_retrievable() {
    let universe = TypeUniverse::new([0; 6]);
    let id = universe.register(
        TypeDecl::new("Person", TypeForm::Interface)
            .with_operation(OperationDecl::new("getName", None)),
    );

    let data = universe.get(id).expect("type should be registered");
    assert_eq!(data.name, "Person");
    assert_eq!(data.form, TypeForm::Interface);
    assert_eq!(data.operations.len(), 1);
    assert_eq!(data.operations[0].declaring_type, id);
}

#[test]
fn assignability_is_reflexive() {
    let universe = TypeUniverse::new([0; 6]);
    let a = universe.register(TypeDecl::new("A", TypeForm::ConcreteClass));
    assert!(universe.is_assignable(a, a));
}

#[test]
fn assignability_follows_superclass_chain() {
    let universe = TypeUniverse::new([0; 6]);
    let animal = universe.register(TypeDecl::new("Animal", TypeForm::AbstractClass));
    let mammal =
        universe.register(TypeDecl::new("Mammal", TypeForm::AbstractClass).extending(animal));
    let dog = universe.register(TypeDecl::new("Dog", TypeForm::ConcreteClass).extending(mammal));

    assert!(universe.is_assignable(animal, dog));
    assert!(universe.is_assignable(mammal, dog));
    assert!(!universe.is_assignable(dog, animal));
}

#[test]
fn assignability_follows_interface_closure() {
    let universe = TypeUniverse::new([0; 6]);
    let base = universe.register(TypeDecl::new("Base", TypeForm::Interface));
    let left = universe.register(TypeDecl::new("Left", TypeForm::Interface).implementing([base]));
    let right = universe.register(TypeDecl::new("Right", TypeForm::Interface).implementing([base]));
    let diamond = universe.register(
        TypeDecl::new("Diamond", TypeForm::ConcreteClass).implementing([left, right]),
    );

    assert!(universe.is_assignable(base, diamond));
    assert!(universe.is_assignable(left, diamond));
    assert!(universe.is_assignable(right, diamond));
}

#[test]
fn unrelated_types_are_not_assignable() {
    let universe = TypeUniverse::new([0; 6]);
    let a = universe.register(TypeDecl::new("A", TypeForm::ConcreteClass));
    let b = universe.register(TypeDecl::new("B", TypeForm::ConcreteClass));
    assert!(!universe.is_assignable(a, b));
    assert!(!universe.is_assignable(b, a));
}

#[test]
fn operations_are_described_with_declaring_type_and_parameters() {
    let universe = TypeUniverse::new([0; 6]);
    let string = universe.register(TypeDecl::new("String", TypeForm::ConcreteClass));
    let person = universe.register(
        TypeDecl::new("Person", TypeForm::Interface)
            .with_operation(OperationDecl::setter("Name", string)),
    );

    let data = universe.get(person).expect("registered");
    assert_eq!(
        universe.describe_operation(&data.operations[0]),
        "Person#setName(String)"
    );
}

#[test]
fn constructors_are_described_with_parameters() {
    let universe = TypeUniverse::new([0; 6]);
    let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
    let holder = universe.register(
        TypeDecl::new("Holder", TypeForm::ConcreteClass)
            .with_constructor(ConstructorDescriptor::new([int])),
    );

    let data = universe.get(holder).expect("registered");
    assert_eq!(
        universe.describe_constructor(holder, &data.constructors[0]),
        "Holder(Int)"
    );
    assert!(data.constructors[0].takes_arguments());
}

#[test]
fn reserved_identifiers_allow_self_referential_declarations() {
    let universe = TypeUniverse::new([0; 6]);
    let node = universe.reserve();
    assert!(universe.get(node).is_none());

    let registered = universe.register_reserved(
        node,
        TypeDecl::new("Node", TypeForm::Interface)
            .with_operation(OperationDecl::getter("Parent", node)),
    );
    assert_eq!(registered, node);

    let data = universe.get(node).expect("registered");
    assert_eq!(data.operations[0].return_type, Some(node));
    assert_eq!(data.operations[0].declaring_type, node);
}
