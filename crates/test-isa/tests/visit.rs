use spirvgen_test_isa::enums::*;
use spirvgen_test_isa::instructions::*;
use spirvgen_test_isa::visit::*;

fn id(n: u32) -> InstRef {
    InstRef::new(n)
}

/// Answers the record type name of every instruction.
struct TypeName;

macro_rules! type_names {
    ($($method:ident: $record:ident),* $(,)?) => {
        $(
            fn $method(&mut self, _: &$record) -> &'static str {
                stringify!($record)
            }
        )*
    };
}

impl InstVisitor for TypeName {
    type Output = &'static str;

    type_names! {
        visit_nop: OpNop,
        visit_undef: OpUndef,
        visit_name: OpName,
        visit_ext_inst_import: OpExtInstImport,
        visit_ext_inst: OpExtInst,
        visit_memory_model: OpMemoryModel,
        visit_entry_point: OpEntryPoint,
        visit_execution_mode: OpExecutionMode,
        visit_capability: OpCapability,
        visit_type_void: OpTypeVoid,
        visit_type_int: OpTypeInt,
        visit_type_image: OpTypeImage,
        visit_constant: OpConstant,
        visit_spec_constant_op: OpSpecConstantOp,
        visit_function: OpFunction,
        visit_function_end: OpFunctionEnd,
        visit_load: OpLoad,
        visit_store: OpStore,
        visit_decorate: OpDecorate,
        visit_i_add: OpIAdd,
        visit_atomic_load: OpAtomicLoad,
        visit_phi: OpPhi,
        visit_switch: OpSwitch,
        visit_return: OpReturn,
        visit_cooperative_matrix_load_khr: OpCooperativeMatrixLoadKHR,
        visit_subgroup_block_read_intel: OpSubgroupBlockReadINTEL,
    }
}

#[test]
fn visit_dispatches_on_the_record() {
    let mut v = TypeName;
    assert_eq!(visit(&mut v, &OpNop::new().into()), "OpNop");
    assert_eq!(
        visit(&mut v, &OpIAdd::new(id(1), id(2), id(3)).into()),
        "OpIAdd"
    );
    assert_eq!(
        visit(&mut v, &OpSubgroupBlockReadINTEL::new(id(1), id(2)).into()),
        "OpSubgroupBlockReadINTEL"
    );
}

#[test]
fn opcode_of_known_tags() {
    assert_eq!(opcode_of(128), Op::IAdd);
    assert_eq!(opcode_of(4457), Op::CooperativeMatrixLoadKHR);
}

#[test]
#[should_panic(expected = "opcode 4450 is not part of the generated instruction set")]
fn opcode_of_unknown_tag_panics() {
    opcode_of(4450);
}

/// Records every callback in order.
#[derive(Default)]
struct Trace {
    events: Vec<String>,
}

impl OperandVisitor for Trace {
    fn pre_visit(&mut self, inst: &Inst) {
        self.events.push(format!("pre {:?}", inst.opcode()));
    }

    fn visit_id(&mut self, id: &InstRef) {
        self.events.push(format!("id {}", id.index()));
    }

    fn visit_memory_access(&mut self, value: &MemoryAccess) {
        self.events.push(format!("access {value}"));
    }

    fn visit_pair_id_ref_id_ref(&mut self, value: &PairIdRefIdRef) {
        self.events
            .push(format!("pair {} {}", value.0.index(), value.1.index()));
    }

    fn visit_literal_ext_inst_integer(&mut self, value: &LiteralExtInstInteger) {
        self.events.push(format!("ext {value}"));
    }
}

fn trace(inst: impl Into<Inst>) -> Vec<String> {
    let mut t = Trace::default();
    walk_operands(&mut t, &inst.into());
    t.events
}

#[test]
fn required_operands_fire_once() {
    assert_eq!(
        trace(OpIAdd::new(id(1), id(2), id(3))),
        ["pre IAdd", "id 1", "id 2", "id 3"]
    );
    assert_eq!(trace(OpNop::new()), ["pre Nop"]);
}

#[test]
fn optional_operands_fire_if_present() {
    assert_eq!(
        trace(OpLoad::new(id(1), id(2), None)),
        ["pre Load", "id 1", "id 2"]
    );
    assert_eq!(
        trace(OpLoad::new(id(1), id(2), Some(MemoryAccess::Aligned))),
        ["pre Load", "id 1", "id 2", "access Aligned"]
    );
}

#[test]
fn repeated_operands_fire_in_order() {
    let phi = OpPhi::new(
        id(1),
        vec![(id(2), id(3)), (id(4), id(5)), (id(6), id(7))],
    );
    assert_eq!(
        trace(phi),
        ["pre Phi", "id 1", "pair 2 3", "pair 4 5", "pair 6 7"]
    );

    let call = OpExtInst::new(id(1), id(2), 26, vec![id(3), id(4), id(5)]);
    assert_eq!(
        trace(call),
        ["pre ExtInst", "id 1", "id 2", "ext 26", "id 3", "id 4", "id 5"]
    );

    let empty = OpEntryPoint::new(ExecutionModel::Kernel, id(1), "k".to_string(), vec![]);
    assert_eq!(trace(empty), ["pre EntryPoint", "id 1"]);
}

#[test]
fn unhandled_kinds_are_skipped() {
    let decorate = OpDecorate::new(id(9), Decoration::SpecId, Some(DecorationAttr::SpecId(3)));
    assert_eq!(trace(decorate), ["pre Decorate", "id 9"]);
}
