use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anchor_di::{
    provides, Component, ConfigurationError, Constructor, ContainerError, DependencyGraphError,
    Disposable, InitError, RequireError, ServiceContainer, TypeInfo,
};
use pretty_assertions::assert_eq;

// A -> B -> C
struct C;
impl Component for C {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|| C)]
    }
}

struct B {
    c: Arc<C>,
}
impl Component for B {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|c: Arc<C>| B { c })]
    }
}

struct A {
    b: Arc<B>,
}
impl Component for A {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|b: Arc<B>| A { b })]
    }
}

// Ping <-> Pong
struct Ping {
    _pong: Arc<Pong>,
}
impl Component for Ping {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_pong: Arc<Pong>| Ping { _pong })]
    }
}
struct Pong {
    _ping: Arc<Ping>,
}
impl Component for Pong {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_ping: Arc<Ping>| Pong { _ping })]
    }
}

// Never bound
struct Unbound;

struct NeedsUnbound {
    _unbound: Arc<Unbound>,
}
impl Component for NeedsUnbound {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_unbound: Arc<Unbound>| NeedsUnbound { _unbound })]
    }
}

trait Storage: Send + Sync {
    fn name(&self) -> &'static str;
}

/// Declares no constructor
struct AbstractStorage;
impl Storage for AbstractStorage {
    fn name(&self) -> &'static str {
        "abstract"
    }
}
impl Component for AbstractStorage {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![]
    }
}
provides!(AbstractStorage => dyn Storage);

struct MemoryStorage;
impl Storage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }
}
impl Component for MemoryStorage {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|| MemoryStorage)]
    }
}
provides!(MemoryStorage => dyn Storage);

struct DiskStorage {
    _c: Arc<C>,
}
impl Storage for DiskStorage {
    fn name(&self) -> &'static str {
        "disk"
    }
}
impl Component for DiskStorage {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_c: Arc<C>| DiskStorage { _c })]
    }
}
provides!(DiskStorage => dyn Storage);

fn assert_fully_resolved(container: &ServiceContainer) {
    let a = container.single::<A>().unwrap();
    let b = container.single::<B>().unwrap();
    let c = container.single::<C>().unwrap();

    assert!(Arc::ptr_eq(&a.b, &b));
    assert!(Arc::ptr_eq(&b.c, &c));
    assert_eq!(container.pending_count(), 0);
    assert_eq!(container.resolved_count(), 3);
}

#[test_log::test]
fn chain_bound_dependents_first_resolves() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<A>()
        .unwrap()
        .bind_self::<B>()
        .unwrap()
        .bind_self::<C>()
        .unwrap();

    assert_eq!(container.pending_count(), 2);
    assert!(container.is_resolved::<C>());

    container.force_resolve().unwrap();

    assert_fully_resolved(&container);
}

#[test_log::test]
fn chain_bound_dependencies_first_resolves_at_bind_time() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<C>()
        .unwrap()
        .bind_self::<B>()
        .unwrap()
        .bind_self::<A>()
        .unwrap();

    assert_eq!(container.pending_count(), 0);

    container.force_resolve().unwrap();

    assert_fully_resolved(&container);
}

#[test_log::test]
fn chain_bound_in_mixed_order_converges() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<B>()
        .unwrap()
        .bind_self::<A>()
        .unwrap()
        .bind_self::<C>()
        .unwrap();

    container.force_resolve().unwrap();

    assert_fully_resolved(&container);
}

#[test]
fn zero_argument_implementation_resolves_at_bind_time() {
    let mut container = ServiceContainer::new();
    container.bind::<dyn Storage, MemoryStorage>().unwrap();

    assert!(container.is_resolved::<dyn Storage>());
    assert_eq!(container.single::<dyn Storage>().unwrap().name(), "memory");
}

#[test]
fn implementation_without_constructor_is_rejected() {
    let mut container = ServiceContainer::new();

    let err = container.bind::<dyn Storage, AbstractStorage>().unwrap_err();

    assert!(matches!(
        err,
        ContainerError::Configuration(ConfigurationError::NotConstructible { implementation })
            if implementation == TypeInfo::of::<AbstractStorage>()
    ));
    assert!(!container.is_bound::<dyn Storage>());
}

// X -> Y -> Z -> X
struct X {
    _y: Arc<Y>,
}
impl Component for X {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_y: Arc<Y>| X { _y })]
    }
}

struct Y {
    _z: Arc<Z>,
}
impl Component for Y {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_z: Arc<Z>| Y { _z })]
    }
}

struct Z {
    _x: Arc<X>,
}
impl Component for Z {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_x: Arc<X>| Z { _x })]
    }
}

#[test_log::test]
fn three_node_cycle_is_circular_and_promotes_nothing() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<Y>()
        .unwrap()
        .bind_self::<C>()
        .unwrap()
        .bind_self::<X>()
        .unwrap()
        .bind_self::<Z>()
        .unwrap();

    let err = container.force_resolve().unwrap_err();

    let InitError::DependencyGraph(errors) = err else {
        panic!("expected a dependency graph error");
    };
    assert!(errors.has_circular_dependency());
    assert!(!errors.has_missing_dependency());
    assert_eq!(container.pending_count(), 3);
    // Only C, resolved when it was bound
    assert_eq!(container.resolved_count(), 1);
    assert!(container.is_resolved::<C>());
    for type_name in [
        std::any::type_name::<X>(),
        std::any::type_name::<Y>(),
        std::any::type_name::<Z>(),
    ] {
        assert!(errors.to_string().contains(type_name));
    }
    assert_eq!(
        container.single::<Z>().err(),
        Some(RequireError::TypeUnresolved(std::any::type_name::<Z>()))
    );
}

#[test_log::test]
fn mutual_dependency_is_circular_and_promotes_nothing() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<C>()
        .unwrap()
        .bind_self::<Ping>()
        .unwrap()
        .bind_self::<Pong>()
        .unwrap();

    let err = container.force_resolve().unwrap_err();

    let InitError::DependencyGraph(errors) = err else {
        panic!("expected a dependency graph error");
    };
    assert!(errors.has_circular_dependency());
    assert_eq!(container.pending_count(), 2);
    assert_eq!(
        container.single::<Ping>().err(),
        Some(RequireError::TypeUnresolved(std::any::type_name::<Ping>()))
    );
}

#[test_log::test]
fn unbound_dependency_is_missing() {
    let mut container = ServiceContainer::new();
    container.bind_self::<NeedsUnbound>().unwrap();

    let err = container.force_resolve().unwrap_err();

    let InitError::DependencyGraph(errors) = err else {
        panic!("expected a dependency graph error");
    };
    assert_eq!(
        errors.errors,
        vec![DependencyGraphError::MissingDependency {
            dependency: TypeInfo::of::<Unbound>(),
            required_by: TypeInfo::of::<NeedsUnbound>(),
        }]
    );
}

#[test]
fn get_unbound_service_is_not_registered() {
    let container = ServiceContainer::new();

    assert_eq!(
        container.single::<A>().err(),
        Some(RequireError::TypeMissing(std::any::type_name::<A>()))
    );
}

#[test]
fn get_pending_service_before_resolve_is_not_registered() {
    let mut container = ServiceContainer::new();
    container.bind_self::<A>().unwrap();

    assert!(container.is_bound::<A>());
    assert_eq!(
        container.single::<A>().err(),
        Some(RequireError::TypeUnresolved(std::any::type_name::<A>()))
    );
}

#[test]
fn bind_single_is_available_immediately() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage);
    let mut container = ServiceContainer::new();
    container.bind_single(storage.clone()).unwrap();

    let resolved = container.single::<dyn Storage>().unwrap();

    assert!(Arc::ptr_eq(&storage, &resolved));
}

#[test_log::test]
fn bind_single_satisfies_pending_dependency() {
    let c = Arc::new(C);
    let mut container = ServiceContainer::new();
    container.bind_self::<B>().unwrap();
    container.bind_single(c.clone()).unwrap();

    container.force_resolve().unwrap();

    assert!(Arc::ptr_eq(&container.single::<B>().unwrap().c, &c));
}

#[test_log::test]
fn rebinding_replaces_previous_binding() {
    let mut container = ServiceContainer::new();
    container
        .bind::<dyn Storage, DiskStorage>()
        .unwrap()
        .bind::<dyn Storage, MemoryStorage>()
        .unwrap();

    // The disk binding was pending on C, the memory binding replaced it
    assert_eq!(container.pending_count(), 0);
    container.force_resolve().unwrap();

    assert_eq!(container.single::<dyn Storage>().unwrap().name(), "memory");
    assert_eq!(container.resolved_count(), 1);
}

struct FailingStorage;
impl Storage for FailingStorage {
    fn name(&self) -> &'static str {
        "failing"
    }
}
impl Component for FailingStorage {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::try_new(|| {
            Err::<FailingStorage, _>("mount failed".to_string())
        })]
    }
}
provides!(FailingStorage => dyn Storage);

#[test_log::test]
fn failed_rebinding_keeps_previous_binding() {
    let mut container = ServiceContainer::new();
    container.bind::<dyn Storage, MemoryStorage>().unwrap();

    let err = container
        .bind::<dyn Storage, FailingStorage>()
        .err()
        .unwrap();

    assert!(matches!(
        err,
        ContainerError::Init(InitError::ConstructionFailed { service, .. })
            if service == TypeInfo::of::<dyn Storage>()
    ));
    assert!(container.is_bound::<dyn Storage>());
    assert!(container.is_resolved::<dyn Storage>());
    assert_eq!(container.single::<dyn Storage>().unwrap().name(), "memory");

    container.force_resolve().unwrap();
    assert_eq!(container.single::<dyn Storage>().unwrap().name(), "memory");
}

#[test]
fn failed_rebinding_keeps_previous_pending_binding() {
    let mut container = ServiceContainer::new();
    container.bind::<dyn Storage, DiskStorage>().unwrap();

    assert!(container.bind::<dyn Storage, FailingStorage>().is_err());

    assert_eq!(container.pending_count(), 1);
    container.bind_self::<C>().unwrap();
    container.force_resolve().unwrap();
    assert_eq!(container.single::<dyn Storage>().unwrap().name(), "disk");
}

#[test]
fn binding_after_resolve_is_rejected() {
    let mut container = ServiceContainer::new();
    container.bind_self::<C>().unwrap();
    container.force_resolve().unwrap();

    let err = container.bind_instance(5_u32).unwrap_err();

    assert_eq!(
        err,
        ConfigurationError::Sealed {
            service: TypeInfo::of::<u32>()
        }
    );
    assert!(matches!(
        container.bind_self::<B>().unwrap_err(),
        ContainerError::Configuration(ConfigurationError::Sealed { .. })
    ));
}

#[test]
fn resolving_twice_is_harmless() {
    let mut container = ServiceContainer::new();
    container.bind_self::<C>().unwrap();

    container.force_resolve().unwrap();
    container.force_resolve().unwrap();

    assert!(container.is_resolved::<C>());
}

// Optional dependencies
struct Metrics;
impl Component for Metrics {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|| Metrics)]
    }
}

struct Handler {
    metrics: Option<Arc<Metrics>>,
}
impl Component for Handler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|metrics: Option<Arc<Metrics>>| Handler { metrics })]
    }
}

#[test]
fn optional_dependency_is_none_when_never_bound() {
    let mut container = ServiceContainer::new();
    container.bind_self::<Handler>().unwrap();

    container.force_resolve().unwrap();

    assert!(container.single::<Handler>().unwrap().metrics.is_none());
}

#[test]
fn optional_dependency_bound_later_is_injected() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<Handler>()
        .unwrap()
        .bind_self::<Metrics>()
        .unwrap();

    container.force_resolve().unwrap();

    let handler = container.single::<Handler>().unwrap();
    let metrics = container.single::<Metrics>().unwrap();
    assert!(Arc::ptr_eq(handler.metrics.as_ref().unwrap(), &metrics));
}

// Constructor selection
struct Flexible {
    used: &'static str,
}
impl Component for Flexible {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new(|| Flexible { used: "default" }),
            Constructor::new(|_c: Arc<C>| Flexible { used: "c" }),
            Constructor::new(|_c: Arc<C>, _m: Arc<Metrics>| Flexible { used: "c+metrics" }),
            Constructor::new(|_m: Arc<Metrics>, _c: Arc<C>| Flexible { used: "metrics+c" }),
        ]
    }
}

#[test]
fn constructor_with_most_parameters_declared_first_is_used() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<Flexible>()
        .unwrap()
        .bind_self::<C>()
        .unwrap()
        .bind_self::<Metrics>()
        .unwrap();

    container.force_resolve().unwrap();

    assert_eq!(container.single::<Flexible>().unwrap().used, "c+metrics");
}

// Failing constructors
struct Broken;
impl Component for Broken {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::try_new(|_c: Arc<C>| {
            Err::<Broken, _>("connection refused".to_string())
        })]
    }
}

#[test]
fn failing_constructor_aborts_resolution() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<Broken>()
        .unwrap()
        .bind_self::<C>()
        .unwrap();

    let err = container.force_resolve().unwrap_err();

    let InitError::ConstructionFailed { service, error } = err else {
        panic!("expected a construction failure");
    };
    assert_eq!(service, TypeInfo::of::<Broken>());
    assert_eq!(error.to_string(), "Error during injection: connection refused");
}

// Disposal
trait Connection: Disposable + Send + Sync {}

struct Pool {
    closed: Arc<AtomicUsize>,
}
impl Connection for Pool {}
impl Disposable for Pool {
    fn dispose(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn dispose_calls_hook_and_unbinds() {
    let closed = Arc::new(AtomicUsize::new(0));
    let pool: Arc<dyn Connection> = Arc::new(Pool {
        closed: closed.clone(),
    });
    let mut container = ServiceContainer::new();
    container.bind_single(pool).unwrap();

    container.dispose::<dyn Connection>().unwrap();

    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(!container.is_bound::<dyn Connection>());
    assert_eq!(
        container.dispose::<dyn Connection>().unwrap_err(),
        RequireError::TypeMissing(std::any::type_name::<dyn Connection>())
    );
}

#[test]
fn container_debug_lists_binding_state() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<C>()
        .unwrap()
        .bind_self::<A>()
        .unwrap();

    let debug = format!("{container:?}");

    assert!(debug.contains("resolved"));
    assert!(debug.contains("pending"));
}

#[test]
fn container_debug_is_sorted_by_service_name() {
    let mut container = ServiceContainer::new();
    container
        .bind_self::<C>()
        .unwrap()
        .bind_self::<A>()
        .unwrap()
        .bind_self::<B>()
        .unwrap();

    let debug = format!("{container:?}");
    let position = |type_name: &str| debug.find(type_name).unwrap();

    assert!(position(std::any::type_name::<A>()) < position(std::any::type_name::<B>()));
    assert!(position(std::any::type_name::<B>()) < position(std::any::type_name::<C>()));
    assert_eq!(debug, format!("{container:?}"));
}

#[test]
fn errors_convert_into_container_error() {
    let mut container = ServiceContainer::new();
    container.bind_self::<A>().unwrap();

    let err: ContainerError = container.single::<A>().err().unwrap().into();

    assert!(matches!(
        err,
        ContainerError::Require(RequireError::TypeUnresolved(_))
    ));
}

#[test]
fn dependency_graph_exposes_edges() {
    let mut container = ServiceContainer::new();
    container.bind_self::<A>().unwrap();

    let graph = container.dependency_graph();
    let dependencies = graph.dependencies_of(std::any::TypeId::of::<A>()).unwrap();

    assert_eq!(dependencies.len(), 1);
    assert_eq!(dependencies[0].type_info, TypeInfo::of::<B>());
}
