use anvil_extension::{Callback, ConfigurationError, Extension, ExtensionMethod, ExtensionRegistry, ParameterRole, Phase};
use proptest::prelude::*;

struct Generated {
    methods: Vec<ExtensionMethod>,
}

impl Extension for Generated {
    fn name(&self) -> &str {
        "tests.Generated"
    }

    fn methods(&self) -> Vec<ExtensionMethod> {
        self.methods.clone()
    }
}

fn phase_strategy() -> impl Strategy<Value = Phase> {
    prop::sample::select(Phase::ALL.to_vec())
}

fn callback(index: usize, phase: Phase, priority: Option<i32>) -> ExtensionMethod {
    let method = ExtensionMethod::new(format!("m{index}"))
        .phase(phase)
        .role(ParameterRole::Messages)
        .invoke(|_| Ok(()));
    match priority {
        Some(priority) => method.priority(priority),
        None => method,
    }
}

proptest! {
    #[test]
    fn prop_explicit_priorities_run_first_in_ascending_order(
        specs in prop::collection::vec((phase_strategy(), prop::option::of(-100i32..100)), 0..24)
    ) {
        let methods = specs
            .iter()
            .enumerate()
            .map(|(i, (phase, priority))| callback(i, *phase, *priority))
            .collect();
        let mut registry = ExtensionRegistry::new();
        registry.register_instance(Generated { methods });
        let plan = registry.discover().unwrap();

        prop_assert_eq!(plan.len(), specs.len());
        for phase in Phase::ALL {
            let priorities: Vec<_> = plan.callbacks(phase).iter().map(Callback::priority).collect();
            let first_unprioritized = priorities.iter().position(Option::is_none).unwrap_or(priorities.len());
            prop_assert!(priorities[first_unprioritized..].iter().all(Option::is_none));
            let explicit: Vec<i32> = priorities[..first_unprioritized].iter().flatten().copied().collect();
            prop_assert!(explicit.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(plan.callbacks(phase).iter().all(|c| c.phase() == phase));
        }
    }

    #[test]
    fn prop_out_of_phase_roles_are_rejected(phase in phase_strategy()) {
        let role = ParameterRole::SyntheticComponents;
        let mut registry = ExtensionRegistry::new();
        registry.register_instance(Generated {
            methods: vec![ExtensionMethod::new("m").phase(phase).role(role.clone()).invoke(|_| Ok(()))],
        });
        let result = registry.discover();
        if role.is_legal_in(phase) {
            prop_assert!(result.is_ok());
        } else {
            let is_illegal_role = matches!(result, Err(ConfigurationError::IllegalRole { .. }));
            prop_assert!(is_illegal_role);
        }
    }
}

#[test]
fn first_invalid_callback_fails_whole_discovery() {
    let mut registry = ExtensionRegistry::new();
    registry.register_instance(Generated {
        methods: vec![
            callback(0, Phase::Discovery, Some(1)),
            ExtensionMethod::new("static_one")
                .phase(Phase::Validation)
                .static_method(true)
                .invoke(|_| Ok(())),
        ],
    });
    let err = registry.discover().unwrap_err();
    assert_eq!(err.method(), "static_one");
    assert!(err.to_string().contains("tests.Generated::static_one"));
}
