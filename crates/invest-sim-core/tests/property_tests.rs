use invest_sim_core::credit::rank::{classify, dscr_bucket, ltv_bucket, RANK_MATRIX};
use invest_sim_core::financing::funding::{solve_max_loan, FundingProblem};
use invest_sim_core::financing::loan::{amortize, annual_payment_factor, LoanTerms};
use invest_sim_core::property::input::{PropertyInput, Structure};
use invest_sim_core::property::region::Region;
use invest_sim_core::tables::SolverSettings;
use invest_sim_core::valuation::appraisal::blend_valuation;
use invest_sim_core::Simulator;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Whole-万円 amount in a range.
fn arb_money(lo: u64, hi: u64) -> impl Strategy<Value = Decimal> {
    (lo..hi).prop_map(Decimal::from)
}

/// Annual rate between 0% and 8% in basis points.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0u32..800u32).prop_map(|bp| Decimal::new(i64::from(bp), 4))
}

/// DSCR between -1.00 and 3.00.
fn arb_dscr() -> impl Strategy<Value = Decimal> {
    (-100i64..300i64).prop_map(|c| Decimal::new(c, 2))
}

fn arb_structure() -> impl Strategy<Value = Structure> {
    prop::sample::select(Structure::ALL.to_vec())
}

fn arb_region() -> impl Strategy<Value = Region> {
    prop::sample::select(Region::ALL.to_vec())
}

prop_compose! {
    fn arb_property()(
        region in arb_region(),
        structure in arb_structure(),
        rent in arb_money(0, 6000),
        rooms in 1u32..60,
        building_cost in arb_money(1, 60000),
        land_cost in arb_money(0, 20000),
        loan in arb_money(0, 80000),
        term in 1u32..=35,
        rate_bp in 0u32..600,
        age in 0u32..60,
        building_area in arb_money(0, 3000),
        land_area in arb_money(1, 2000),
        elevator in any::<bool>(),
    ) -> PropertyInput {
        PropertyInput {
            address: "沖縄市泡瀬4丁目".into(),
            region,
            annual_rent: rent,
            rooms,
            building_cost,
            land_cost,
            loan_amount: loan,
            loan_term_years: term,
            interest_rate_pct: Decimal::new(i64::from(rate_bp), 2),
            structure,
            building_age_years: age,
            building_area_sqm: building_area,
            land_area_sqm: land_area,
            has_elevator: elevator,
        }
    }
}

proptest! {
    // Bank appraisal and collateral are fixed blends of the two approaches.
    #[test]
    fn blend_identities_hold(
        land in arb_money(0, 50000),
        building in arb_money(0, 50000),
        noi in (-2000i64..5000i64).prop_map(Decimal::from),
    ) {
        let v = blend_valuation(land, building, noi, Decimal::new(34, 3), Decimal::new(55, 3));
        prop_assert_eq!(
            v.bank_appraisal_value,
            Decimal::new(7, 1) * v.cost_approach_value + Decimal::new(3, 1) * v.income_approach_value
        );
        prop_assert_eq!(v.collateral_value, Decimal::new(8, 1) * v.bank_appraisal_value);
        prop_assert!(v.collateral_value >= Decimal::ZERO);
        prop_assert!(v.collateral_value <= v.bank_appraisal_value);
        prop_assert!(v.bank_appraisal_value <= v.cost_approach_value.max(v.income_approach_value));
    }

    // Rank never improves as DSCR falls or LTV rises.
    #[test]
    fn rank_monotone(
        d1 in arb_dscr(),
        d2 in arb_dscr(),
        l1 in (0i64..20000i64).prop_map(|c| Decimal::new(c, 2)),
        l2 in (0i64..20000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let (dscr_hi, dscr_lo) = if d1 >= d2 { (d1, d2) } else { (d2, d1) };
        let (ltv_lo, ltv_hi) = if l1 <= l2 { (l1, l2) } else { (l2, l1) };
        prop_assert!(classify(dscr_hi, Some(ltv_lo)) <= classify(dscr_lo, Some(ltv_lo)));
        prop_assert!(classify(dscr_hi, Some(ltv_lo)) <= classify(dscr_hi, Some(ltv_hi)));
        prop_assert_eq!(
            classify(d1, Some(l1)),
            RANK_MATRIX[dscr_bucket(d1)][ltv_bucket(Some(l1))]
        );
    }

    // Amortisation ends at exactly zero and never increases.
    #[test]
    fn amortization_reaches_zero(
        principal in arb_money(1, 100000),
        rate in arb_rate(),
        term in 1u32..=35,
    ) {
        let s = amortize(&LoanTerms { principal, annual_rate: rate, term_years: term }).unwrap();
        prop_assert_eq!(s.years.len(), term as usize);
        prop_assert_eq!(s.years[s.years.len() - 1].closing_balance, Decimal::ZERO);
        let mut previous = principal;
        for y in &s.years {
            prop_assert!(y.closing_balance <= previous);
            prop_assert!(y.closing_balance >= Decimal::ZERO);
            previous = y.closing_balance;
        }
    }

    // The solved loan holds the target rank, and a higher ceiling never lowers it.
    #[test]
    fn funding_solution_is_maximal_and_monotone(
        noi in (-500i64..4000i64).prop_map(Decimal::from),
        collateral in arb_money(0, 40000),
        ceiling in arb_money(0, 40000),
        extra in arb_money(0, 20000),
        rate in arb_rate(),
        term in 1u32..=35,
    ) {
        let factor = annual_payment_factor(rate, term).unwrap();
        let problem = FundingProblem {
            noi,
            payment_factor: factor,
            collateral_value: collateral,
            loan_ceiling: ceiling,
            total_acquisition_cost: ceiling,
        };
        let settings = SolverSettings::default();
        let s = solve_max_loan(&problem, &settings).unwrap();
        let best = problem.metrics_at(Decimal::ZERO).rank;
        prop_assert_eq!(s.achieved_rank, best);
        prop_assert!(s.estimated_loan_amount <= ceiling);

        let wider = FundingProblem { loan_ceiling: ceiling + extra, ..problem };
        let w = solve_max_loan(&wider, &settings).unwrap();
        prop_assert!(w.estimated_loan_amount >= s.estimated_loan_amount);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Full pipeline: running sums, balances and determinism on random properties.
    #[test]
    fn simulation_invariants(input in arb_property()) {
        let sim = Simulator::default();
        let out = sim.simulate(&input).unwrap();
        let r = &out.result;

        prop_assert_eq!(r.long_term_projection.len(), 35);
        prop_assert_eq!(r.risk.rank, classify(r.risk.dscr, r.risk.ltv));
        prop_assert_eq!(r.expenses.total, r.expenses.items().iter().map(|(_, v)| *v).sum::<Decimal>());

        let mut sum = Decimal::ZERO;
        let mut previous_balance = input.loan_amount;
        for p in &r.long_term_projection {
            sum += p.cash_flow;
            prop_assert_eq!(p.cumulative_cash_flow, sum);
            prop_assert!(p.loan_balance <= previous_balance);
            if p.year >= input.loan_term_years {
                prop_assert_eq!(p.loan_balance, Decimal::ZERO);
            }
            previous_balance = p.loan_balance;
        }

        let again = sim.simulate(&input).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&out).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }
}
