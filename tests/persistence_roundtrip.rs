//! Property tests for the save/load round trip.

use proptest::prelude::*;
use skirmish::{load_from_target, serialize, write_to_target, Encounter};
use tempfile::tempdir;

/// One engine operation with arbitrary arguments.
#[derive(Debug, Clone)]
enum Op {
    Add(String, i32, i32, bool),
    Start,
    Advance,
    AdjustHp(usize, i32),
    TempHp(usize, i32),
    AddStatus(usize, String),
    RemoveStatus(usize, String),
    End,
    Details(String, String),
    Duplicate(usize, usize),
    Initiative(usize, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let label = "[A-Za-z ]{0,12}";
    prop_oneof![
        (label, -5i32..30, -5i32..60, any::<bool>())
            .prop_map(|(name, init, hp, player)| Op::Add(name, init, hp, player)),
        Just(Op::Start),
        Just(Op::Advance),
        (0usize..6, -80i32..80).prop_map(|(i, d)| Op::AdjustHp(i, d)),
        (0usize..6, -5i32..20).prop_map(|(i, a)| Op::TempHp(i, a)),
        (0usize..6, "Prone|Stunned|Hexed").prop_map(|(i, e)| Op::AddStatus(i, e)),
        (0usize..6, "Prone|Stunned|Hexed").prop_map(|(i, e)| Op::RemoveStatus(i, e)),
        Just(Op::End),
        (label, label).prop_map(|(c, e)| Op::Details(c, e)),
        (0usize..6, 0usize..3).prop_map(|(i, n)| Op::Duplicate(i, n)),
        (0usize..6, -5i32..30).prop_map(|(i, n)| Op::Initiative(i, n)),
    ]
}

/// Applies operations, ignoring rejected ones, to reach an arbitrary state.
fn build(ops: &[Op]) -> Encounter {
    let mut encounter = Encounter::new();
    for op in ops {
        let _ = match op.clone() {
            Op::Add(name, init, hp, player) => encounter.add_combatant(name, init, hp, player),
            Op::Start => encounter.start_combat(),
            Op::Advance => encounter.advance_turn(),
            Op::AdjustHp(i, d) => encounter.adjust_hp(i, d),
            Op::TempHp(i, a) => encounter.set_temporary_hp(i, a),
            Op::AddStatus(i, e) => encounter.add_status_effect(i, e),
            Op::RemoveStatus(i, e) => encounter.remove_status_effect(i, &e),
            Op::End => encounter.end_combat(),
            Op::Details(c, e) => encounter.set_encounter_details(c, e),
            Op::Duplicate(i, n) => encounter.duplicate_combatant(i, n),
            Op::Initiative(i, n) => encounter.change_initiative(i, n),
        };
    }
    encounter
}

proptest! {
    #[test]
    fn prop_save_load_reproduces_encounter(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let encounter = build(&ops);
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_to_target(&serialize(&encounter).unwrap(), &path).unwrap();
        let loaded = load_from_target(&path).unwrap();

        prop_assert_eq!(loaded.save_target.as_deref(), Some(path.as_path()));
        prop_assert_eq!(Encounter { save_target: None, ..loaded }, encounter);
    }

    #[test]
    fn prop_hit_points_stay_in_bounds(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let encounter = build(&ops);
        for combatant in encounter.combatants.iter().filter(|c| c.max_hp >= 0) {
            prop_assert!(combatant.current_hp >= 0);
            prop_assert!(combatant.current_hp <= combatant.max_hp);
            prop_assert!(combatant.temporary_hp >= 0);
        }
        if encounter.is_active {
            prop_assert!(encounter.round >= 1);
            prop_assert!(encounter.active_turn().is_some());
        }
    }
}
