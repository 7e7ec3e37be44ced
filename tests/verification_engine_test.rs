// ==========================================
// 校验引擎集成测试
// ==========================================
// 测试目标: 两阶段校验流程 + 整板结论 + 单板错误分级
// 覆盖范围: 合格板全链路、换算边界、碳当量双写、降级校验、
//           细化元素标注口径(两厂差异)、幂等性
// ==========================================


use plate_cert_verifier::domain::measurement::ChemicalElement;
use plate_cert_verifier::error::VerifyError;
use plate_cert_verifier::rules::limit::{Limit, Target};
use plate_cert_verifier::VerificationEngine;
use test_helpers::{bare_plate, compliant_jg_dh36_tm, compliant_xg_dh36_tm, compliant_xg_grade_a, set_element, set_impact};

// ==========================================
// 测试用例 1: 合格板全链路
// ==========================================

#[test]
fn test_compliant_grade_a_plate_verifies() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_grade_a();

    let summary = engine.verify(&mut plate).unwrap();

    assert!(summary.verified);
    assert!(summary.failed.is_empty());
    assert_eq!(summary.group_sets_checked, 0); // A 级无细化元素要求
    assert!(plate.all_valid());
    // 被命中的检测项都有可解释消息
    assert!(plate.element("C").unwrap().message.is_some());
    assert!(plate.yield_strength.message.is_some());
}

#[test]
fn test_compliant_dh36_tm_plate_verifies() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_dh36_tm();

    let summary = engine.verify(&mut plate).unwrap();

    assert!(summary.verified, "不合格项: {:?}", summary.failed);
    assert_eq!(summary.group_sets_checked, 1);
    // 细化元素: AL 策略首个通过,Als/Alt 留 PASS 痕迹
    assert!(plate
        .element("Als")
        .unwrap()
        .message
        .as_deref()
        .unwrap()
        .contains("PASS"));
}

// ==========================================
// 测试用例 2: 换算值边界(0.20 上限三连)
// ==========================================

#[test]
fn test_derived_value_boundary_against_maximum() {
    let limit = Limit::maximum(Target::Element("C".to_string()), 0.20);

    // 读数 19/20/21,精度 2 → 0.19 通过 / 0.20 通过 / 0.21 不通过
    for (raw, expected) in [(19, true), (20, true), (21, false)] {
        let element = ChemicalElement::new("C", Some(raw), Some(2));
        let (pass, _) = limit.evaluate(element.derived.unwrap());
        assert_eq!(pass, expected, "读数 {} 判定异常", raw);
    }
}

// ==========================================
// 测试用例 3: 碳当量双元素回写
// ==========================================

#[test]
fn test_carbon_equivalent_pass_at_limit() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_grade_a();
    set_element(&mut plate, "C", 20, 2); // 0.20
    set_element(&mut plate, "Mn", 120, 2); // 1.20 → C+Mn/6 = 0.40 整

    let summary = engine.verify(&mut plate).unwrap();

    assert!(summary.verified, "不合格项: {:?}", summary.failed);
}

#[test]
fn test_carbon_equivalent_fail_writes_both_elements() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_grade_a();
    set_element(&mut plate, "C", 20, 2); // 0.20,自身上限 0.21 内
    set_element(&mut plate, "Mn", 121, 2); // 1.21 → C+Mn/6 = 0.4017 超限

    let summary = engine.verify(&mut plate).unwrap();

    assert!(!summary.verified);
    // 两个参与元素同判同消息
    for symbol in ["C", "Mn"] {
        let element = plate.element(symbol).unwrap();
        assert!(!element.valid, "{} 应随碳当量判废", symbol);
        assert!(element.message.as_deref().unwrap().contains("C+Mn/6"));
    }
    // C 自身上限通过的痕迹仍在(AND 合并,不覆盖)
    assert!(plate
        .element("C")
        .unwrap()
        .message
        .as_deref()
        .unwrap()
        .contains("PASS"));
}

// ==========================================
// 测试用例 4: 钢级未识别的降级校验
// ==========================================

#[test]
fn test_unknown_grade_partial_verification() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = bare_plate("XG", "Q345B", 20.0, "AR");
    set_element(&mut plate, "P", 20, 3); // 0.020 合格
    set_element(&mut plate, "S", 45, 3); // 0.045 超限

    let summary = engine.verify(&mut plate).unwrap();

    assert!(!summary.verified); // 钢级未识别必不合格
    assert!(!plate.grade.valid);
    assert!(plate
        .grade
        .message
        .as_deref()
        .unwrap()
        .contains("不在湘钢规则表内"));
    // 元素级部分报告仍然产出
    assert!(plate.element("P").unwrap().valid);
    assert!(!plate.element("S").unwrap().valid);
}

// ==========================================
// 测试用例 5: 单板错误分级
// ==========================================

#[test]
fn test_unknown_mill() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = bare_plate("WG", "A", 20.0, "AR");

    let result = engine.verify(&mut plate);

    assert!(matches!(
        result,
        Err(VerifyError::UnknownMill { mill }) if mill == "WG"
    ));
}

#[test]
fn test_impact_record_count_must_be_four() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_dh36_tm();
    plate.impact_energies.truncate(3); // 缺平均值记录

    let result = engine.verify(&mut plate);

    assert!(matches!(
        result,
        Err(VerifyError::ImpactRecordCount { actual: 3, .. })
    ));
}

#[test]
fn test_missing_element_is_fatal_for_plate() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_grade_a();
    plate.elements.remove("Mn");

    let result = engine.verify(&mut plate);

    assert!(matches!(
        result,
        Err(VerifyError::MissingData { field, .. }) if field == "Mn"
    ));
}

#[test]
fn test_missing_mechanical_value_is_fatal() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_grade_a();
    plate.yield_strength.value = None;

    let result = engine.verify(&mut plate);

    assert!(matches!(
        result,
        Err(VerifyError::MissingData { field, .. }) if field == "ReH"
    ));
}

#[test]
fn test_caller_continues_after_single_plate_failure() {
    // 一板出错不影响后续钢板: 模拟批量流程
    let engine = VerificationEngine::with_builtin();
    let mut bad = compliant_xg_grade_a();
    bad.elements.remove("Mn");
    let mut good = compliant_xg_grade_a();
    good.plate_no = "P23002".to_string();

    let mut verified_count = 0;
    let mut manual_review = Vec::new();
    for plate in [&mut bad, &mut good] {
        match engine.verify(plate) {
            Ok(summary) if summary.verified => verified_count += 1,
            Ok(_) => {}
            Err(_) => manual_review.push(plate.plate_no.clone()),
        }
    }

    assert_eq!(verified_count, 1);
    assert_eq!(manual_review, vec!["P23001".to_string()]);
}

// ==========================================
// 测试用例 6: 细化元素全失败的标注口径(两厂差异)
// ==========================================

#[test]
fn test_xg_union_annotation_on_total_failure() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_xg_dh36_tm();
    set_element(&mut plate, "Als", 5, 3); // 0.005 不达标
    set_element(&mut plate, "Alt", 5, 3); // 0.005 不达标
    set_element(&mut plate, "Nb", 10, 3); // 0.010 低于 0.020

    let summary = engine.verify(&mut plate).unwrap();

    assert!(!summary.verified);
    // 并集口径: 所有被尝试策略引用且在板上的元素全部标废
    for symbol in ["Als", "Alt", "Nb"] {
        let element = plate.element(symbol).unwrap();
        assert!(!element.valid, "{} 应在并集标注范围内", symbol);
        let msg = element.message.as_deref().unwrap();
        assert!(msg.contains("[AL]"), "{} 消息应列明 AL 策略: {}", symbol, msg);
        assert!(msg.contains("[NB]"), "{} 消息应列明 NB 策略: {}", symbol, msg);
    }
}

#[test]
fn test_jg_best_group_annotation_on_total_failure() {
    let engine = VerificationEngine::with_builtin();
    let mut plate = compliant_jg_dh36_tm();
    set_element(&mut plate, "Als", 5, 3); // 0.005 不达标
    set_element(&mut plate, "Alt", 5, 3); // 0.005 不达标
    set_element(&mut plate, "Ti", 10, 3); // 0.010 在 AL+TI 的 Ti 界限内

    let summary = engine.verify(&mut plate).unwrap();

    assert!(!summary.verified);
    // 最优组口径: 只标注失败成员最少的组(并列取声明序在前的 AL)
    assert!(!plate.element("Als").unwrap().valid);
    assert!(!plate.element("Alt").unwrap().valid);
    let ti = plate.element("Ti").unwrap();
    assert!(ti.valid, "Ti 不在最优组标注范围内");
    assert!(ti.message.is_none());
}

// ==========================================
// 测试用例 7: 幂等性与汇总不变式
// ==========================================

#[test]
fn test_verification_is_deterministic() {
    let engine = VerificationEngine::with_builtin();
    let source = compliant_xg_dh36_tm();

    let mut first = source.clone();
    let mut second = source.clone();
    let summary_first = engine.verify(&mut first).unwrap();
    let summary_second = engine.verify(&mut second).unwrap();

    assert_eq!(summary_first.verified, summary_second.verified);
    assert_eq!(summary_first.failed, summary_second.failed);
    // 两次校验后的钢板判定字段逐项一致
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_verdict_equals_and_over_all_measurements() {
    let engine = VerificationEngine::with_builtin();

    let mut passing = compliant_xg_dh36_tm();
    let summary = engine.verify(&mut passing).unwrap();
    assert_eq!(summary.verified, passing.all_valid());

    let mut failing = compliant_xg_grade_a();
    failing.tensile_strength.value = Some(530.0); // 超出 400-520 区间
    let summary = engine.verify(&mut failing).unwrap();
    assert_eq!(summary.verified, failing.all_valid());
    assert!(!summary.verified);
    assert!(summary.failed.contains(&"TENSILE_STRENGTH".to_string()));
}

// ==========================================
// 测试用例 8: 冲击记录非必试时不附带界限
// ==========================================

#[test]
fn test_exempt_plate_keeps_unrequested_impact_records_untouched() {
    let engine = VerificationEngine::with_builtin();
    // A 级 40mm 免试,但质保书仍附了冲击记录
    let mut plate = compliant_xg_grade_a();
    plate.thickness.value = Some(40.0);
    set_impact(&mut plate, 20.0, "L", [20.0, 18.0, 16.0], 18.0); // 数值低也无妨

    let summary = engine.verify(&mut plate).unwrap();

    assert!(summary.verified); // 免试档不评冲击
    for energy in &plate.impact_energies {
        assert!(energy.valid);
        assert!(energy.message.is_none());
    }
}

// ==========================================
// 测试用例 9: 钢厂代码未注册时的显式注册表
// ==========================================

#[test]
fn test_registry_is_explicit_not_global() {
    use plate_cert_verifier::rules::{SelectorRegistry, XgSelector};

    // 只注册湘钢的注册表: 济钢板报 UnknownMill
    let mut registry = SelectorRegistry::new();
    registry.register(Box::new(XgSelector::new()));
    let engine = VerificationEngine::new(registry);

    let mut plate = compliant_jg_dh36_tm();
    let result = engine.verify(&mut plate);

    assert!(matches!(result, Err(VerifyError::UnknownMill { .. })));
}
