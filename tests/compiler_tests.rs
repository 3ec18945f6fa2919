// Layout and addressing properties of the compiler, checked directly against the image.

use itsy::lang::code::{Instruction, OpCode, UNRESOLVED_TARGET};
use itsy::runtime::data_structures::allocator::FRONTIER_ADDRESS;
use itsy::runtime::data_structures::dictionary::{HEADER_CELLS, LAST_ENTRY_ADDRESS};
use itsy::{Address, Compiler, Config, Result, ScriptError};
use test_case::test_case;

fn new_compiler() -> Compiler {
    Compiler::new(&Config::default()).unwrap()
}

/// One step of a small program, so a sequence can be replayed against a fresh compiler.
#[derive(Clone, Copy, Debug)]
enum Step {
    Primitive(&'static str),
    Constant(&'static str, i64),
    Variable(&'static str, i64),
    ColonStart(&'static str),
    ColonEnd,
    Call(&'static str),
    Literal(i64),
    Data(i64),
    Begin,
    Again,
    If,
    Else,
    Endif,
}

fn apply(compiler: &mut Compiler, step: Step) -> Result<Address> {
    match step {
        Step::Primitive(name) => compiler.compile_primitive(name),
        Step::Constant(name, value) => compiler.compile_constant(name, value),
        Step::Variable(name, value) => compiler.compile_variable(name, value),
        Step::ColonStart(name) => compiler.compile_colon_start(name),
        Step::ColonEnd => compiler.compile_colon_end(),
        Step::Call(name) => compiler.compile_call_by_name(name),
        Step::Literal(value) => compiler.compile_literal(value),
        Step::Data(value) => compiler.compile_data(value),
        Step::Begin => compiler.compile_begin(),
        Step::Again => compiler.compile_again(),
        Step::If => compiler.compile_if(),
        Step::Else => compiler.compile_else(),
        Step::Endif => compiler.compile_endif(),
    }
}

const PROGRAM: &[Step] = &[
    Step::Primitive("dup"),
    Step::Constant("ten", 10),
    Step::Variable("total", 0),
    Step::Data(3),
    Step::ColonStart("work"),
    Step::Begin,
    Step::Call("dup"),
    Step::If,
    Step::Call("ten"),
    Step::Else,
    Step::Literal(1),
    Step::Call("total"),
    Step::Endif,
    Step::Again,
    Step::ColonEnd,
];

#[test]
fn bootstrap_cells_are_at_fixed_addresses() {
    let compiler = new_compiler();

    assert_eq!(FRONTIER_ADDRESS, Address::new(0));
    assert_eq!(LAST_ENTRY_ADDRESS, Address::new(1));
    assert_eq!(compiler.image().get_cell(FRONTIER_ADDRESS), Ok(2));
    assert_eq!(compiler.image().get_cell(LAST_ENTRY_ADDRESS), Ok(0));
}

#[test]
fn frontier_never_moves_backwards() {
    let mut compiler = new_compiler();
    let mut previous = compiler.frontier().unwrap();

    for step in PROGRAM {
        let address = apply(&mut compiler, *step).unwrap();
        let frontier = compiler.frontier().unwrap();

        assert!(frontier >= previous, "{:?} moved the frontier back", step);

        match step {
            // These only record or patch an address, they allocate nothing.
            Step::Begin => assert_eq!(address, previous),
            Step::Endif => assert!(address < previous),
            _ => assert!(
                address >= previous && address < frontier,
                "{:?} returned {} outside of [{}, {})",
                step,
                address,
                previous,
                frontier
            ),
        }

        previous = frontier;
    }

    assert_eq!(compiler.pending_marks(), 0);
    assert_eq!(compiler.finish(), Ok(()));
}

#[test]
fn redefinition_shadows_but_earlier_calls_keep_their_binding() {
    let mut compiler = new_compiler();

    let first = compiler.compile_constant("foo", 1).unwrap();
    let _ = compiler.compile_colon_start("early").unwrap();
    let early_call = compiler.compile_call_by_name("foo").unwrap();
    let _ = compiler.compile_colon_end().unwrap();

    let second = compiler.compile_constant("foo", 2).unwrap();
    let _ = compiler.compile_colon_start("late").unwrap();
    let late_call = compiler.compile_call_by_name("foo").unwrap();
    let _ = compiler.compile_colon_end().unwrap();

    assert_ne!(first, second);
    assert_eq!(compiler.resolve("foo"), Some(second));
    assert_eq!(
        compiler.image().read_instruction(early_call),
        Ok(Instruction::with_target(OpCode::DoColon, first).unwrap())
    );
    assert_eq!(
        compiler.image().read_instruction(late_call),
        Ok(Instruction::with_target(OpCode::DoColon, second).unwrap())
    );
}

#[test]
fn image_walk_agrees_with_the_index() {
    let mut compiler = new_compiler();

    for step in PROGRAM {
        let _ = apply(&mut compiler, *step).unwrap();
    }

    let _ = compiler.compile_constant("ten", 11).unwrap();

    let dictionary = compiler.dictionary();
    let entries: Vec<_> = dictionary
        .iter(compiler.image())
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(entries.len(), dictionary.len());
    assert_eq!(entries.last().map(|entry| entry.previous), Some(Address::NULL));

    for entry in &entries {
        let newest = entries.iter().find(|other| other.name == entry.name);
        assert_eq!(newest.map(|other| other.address), compiler.resolve(&entry.name));
    }
}

#[test_case("x"; "single letter")]
#[test_case("colon-word"; "with punctuation")]
#[test_case("a-name-of-exactly-31-bytes-long"; "longest name")]
fn colon_body_starts_right_after_the_header(name: &str) {
    let mut compiler = new_compiler();

    let entry = compiler.compile_colon_start(name).unwrap();
    let first = compiler.compile_literal(5).unwrap();

    assert_eq!(first, entry.offset(HEADER_CELLS));

    let decoded = compiler.dictionary().entry(compiler.image(), entry).unwrap();
    assert_eq!(decoded.name, name);
    assert_eq!(
        decoded.reference,
        Instruction::with_target(OpCode::DoColon, entry.offset(HEADER_CELLS)).unwrap()
    );
}

#[test]
fn overlong_names_are_rejected_without_side_effects() {
    let mut compiler = new_compiler();
    let name = "a-name-that-is-32-bytes-long-xyz";
    let before = compiler.frontier().unwrap();

    let result = compiler.compile_colon_start(name);

    assert!(matches!(result, Err(ScriptError::NameTooLong { length: 32, max: 31, .. })));
    assert!(result.unwrap_err().is_compile_error());
    assert_eq!(compiler.frontier(), Ok(before));
    assert_eq!(compiler.resolve(name), None);
}

#[test]
fn else_targets_the_first_cell_of_the_false_branch() {
    let mut compiler = new_compiler();

    let _ = compiler.compile_colon_start("choose").unwrap();
    let zero_branch = compiler.compile_if().unwrap();

    assert_eq!(
        compiler.image().read_instruction(zero_branch),
        Ok(Instruction::new(OpCode::ZeroBranch, UNRESOLVED_TARGET))
    );

    let _ = compiler.compile_literal(1).unwrap();
    let branch = compiler.compile_else().unwrap();
    let _ = compiler.compile_literal(2).unwrap();
    let _ = compiler.compile_endif().unwrap();
    let join = compiler.frontier().unwrap();

    let image = compiler.image();

    assert_eq!(
        image.read_instruction(zero_branch).unwrap().target(),
        Ok(branch.offset(1))
    );
    assert_eq!(image.read_instruction(branch).unwrap().target(), Ok(join));
}

#[test]
fn nested_constructs_patch_innermost_first() {
    let mut compiler = new_compiler();

    let _ = compiler.compile_colon_start("nest").unwrap();
    let start = compiler.compile_begin().unwrap();
    let outer_if = compiler.compile_if().unwrap();
    let inner_if = compiler.compile_if().unwrap();
    let _ = compiler.compile_literal(1).unwrap();
    let inner_join = compiler.frontier().unwrap();
    let _ = compiler.compile_endif().unwrap();
    let _ = compiler.compile_literal(2).unwrap();
    let outer_join = compiler.frontier().unwrap();
    let _ = compiler.compile_endif().unwrap();
    let back = compiler.compile_again().unwrap();
    let _ = compiler.compile_colon_end().unwrap();

    let image = compiler.image();

    assert_eq!(image.read_instruction(inner_if).unwrap().target(), Ok(inner_join));
    assert_eq!(image.read_instruction(outer_if).unwrap().target(), Ok(outer_join));
    assert_eq!(
        image.read_instruction(back),
        Ok(Instruction::with_target(OpCode::Branch, start).unwrap())
    );
}

#[test_case(Step::Again; "again")]
#[test_case(Step::Else; "else")]
#[test_case(Step::Endif; "endif")]
fn closing_directives_need_an_open_construct(step: Step) {
    let mut compiler = new_compiler();
    let before = compiler.frontier().unwrap();

    let result = apply(&mut compiler, step);

    assert!(matches!(result, Err(ScriptError::UnbalancedControlFlow(_))));
    assert_eq!(compiler.frontier(), Ok(before));
}

#[test]
fn leftover_marks_are_reported() {
    let mut compiler = new_compiler();

    let _ = compiler.compile_begin().unwrap();
    let _ = compiler.compile_if().unwrap();

    assert_eq!(compiler.pending_marks(), 2);
    assert!(matches!(
        compiler.finish(),
        Err(ScriptError::UnbalancedControlFlow(_))
    ));

    let _ = compiler.compile_endif().unwrap();
    let _ = compiler.compile_again().unwrap();

    assert_eq!(compiler.finish(), Ok(()));
}

#[test]
fn a_bounded_image_reports_exhaustion() {
    let config = Config {
        max_cells: Some(2 + HEADER_CELLS + 2),
        ..Config::default()
    };
    let mut compiler = Compiler::new(&config).unwrap();

    let _ = compiler.compile_colon_start("w").unwrap();
    let _ = compiler.compile_literal(1).unwrap();
    let _ = compiler.compile_colon_end().unwrap();

    let result = compiler.compile_literal(2);

    assert!(matches!(
        result,
        Err(ScriptError::OutOfAddressSpace { requested: 1, limit: 10, .. })
    ));
}
