use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::{MAX_RESERVED_STATUS_CODE, ONE_NEAR, TGAS};
use crate::tests::test_utils::*;
use crate::*;

fn charge_for(gas: u64) -> u128 {
    calculate_charge(gas, GAS_PRICE, RELAY_FEE)
}

fn relayed(outcome: RelayCallOutcome) -> (RelayCallStatus, u128) {
    match outcome {
        RelayCallOutcome::Relayed { status, charge } => (status, charge),
        other => panic!("expected relayed outcome, got {other:?}"),
    }
}

// --- Happy path ---

#[test]
fn end_to_end_relays_and_bills_sponsor() {
    let mut f = default_setup();
    let request = signed_request(0);

    let (status, charge) = relayed(f.relay_call(&request).unwrap());

    // pre 2 + target 5 + post 2 + overhead 5
    assert_eq!(status, RelayCallStatus::Ok);
    assert_eq!(charge, charge_for(14 * TGAS));
    assert!(charge <= max_possible_charge(GAS_LIMIT, GAS_PRICE, RELAY_FEE));
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert_eq!(f.hub.balance_of(&owner()), charge);
    assert_eq!(f.ledger.account_nonce(&user()), 1);
    assert_eq!(
        f.target_log.borrow().calls,
        vec![(b"increment".to_vec(), user())]
    );
    assert_eq!(
        f.hub.events().last(),
        Some(&HubEvent::TransactionRelayed {
            relay: relay(),
            sender: user(),
            sponsor: sponsor(),
            status: RelayCallStatus::Ok,
            charge,
        })
    );
}

#[test]
fn hooks_receive_context_and_estimate() {
    let mut f = default_setup();

    f.relay_call(&signed_request(0)).unwrap();

    let log = f.sponsor_log.borrow();
    assert_eq!(log.pre_contexts, vec![b"ctx".to_vec()]);
    assert_eq!(
        log.max_possible_charges,
        vec![max_possible_charge(GAS_LIMIT, GAS_PRICE, RELAY_FEE)]
    );
    // pre 2 + target 5 billed so far, plus the post cap and overhead
    assert_eq!(
        log.post_calls,
        vec![PostCall {
            context: b"ctx".to_vec(),
            success: true,
            actual_charge: charge_for(22 * TGAS),
            pre_return: b"pre".to_vec(),
        }]
    );
}

#[test]
fn relay_owner_can_withdraw_earnings() {
    let mut f = default_setup();
    let (_, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    f.hub
        .withdraw(&mut f.ledger, &owner(), charge, &owner())
        .unwrap();

    assert_eq!(f.hub.balance_of(&owner()), 0);
    assert_eq!(f.ledger.account_balance(&owner()), near(98) + charge);
}

#[test]
fn replayed_request_is_rejected_without_charge() {
    let mut f = default_setup();
    let request = signed_request(0);
    f.relay_call(&request).unwrap();
    let balance = f.hub.balance_of(&sponsor());

    let outcome = f.relay_call(&request).unwrap();

    assert_eq!(
        outcome,
        RelayCallOutcome::Rejected {
            reason: PreconditionCheck::WrongNonce.code()
        }
    );
    assert_eq!(f.hub.balance_of(&sponsor()), balance);
    assert_eq!(f.target_log.borrow().calls.len(), 1);
}

#[test]
fn sequential_nonces_relay() {
    let mut f = default_setup();

    for nonce in 0..3 {
        f.ledger.begin_transaction(PREPAID_GAS, GAS_PRICE);
        let (status, _) = relayed(f.relay_call(&signed_request(nonce)).unwrap());
        assert_eq!(status, RelayCallStatus::Ok);
    }
    assert_eq!(f.ledger.account_nonce(&user()), 3);
}

// --- Hard aborts ---

#[test]
fn caller_must_be_designated_relay() {
    let mut f = default_setup();

    let err = f
        .hub
        .relay_call(&mut f.ledger, &mut f.contracts, &other(), &signed_request(0))
        .unwrap_err();
    assert_eq!(err, HubError::InvalidCaller);
    assert_eq!(f.sponsor_log.borrow().pre_calls, 0);
}

#[test]
fn unregistered_relay_aborts() {
    let mut f = default_setup();
    f.hub
        .remove_relay_by_owner(&mut f.ledger, &owner(), &relay())
        .unwrap();
    let events_before = f.hub.events().len();

    let err = f.relay_call(&signed_request(0)).unwrap_err();

    assert_eq!(err, HubError::UnknownRelay);
    assert_eq!(f.hub.events().len(), events_before);
}

#[test]
fn gas_price_below_request_aborts() {
    let mut f = default_setup();
    f.ledger.begin_transaction(PREPAID_GAS, GAS_PRICE - 1);

    let err = f.relay_call(&signed_request(0)).unwrap_err();
    assert_eq!(err, HubError::InvalidGasPrice);
}

#[test]
fn higher_transaction_gas_price_is_accepted() {
    let mut f = default_setup();
    f.ledger.begin_transaction(PREPAID_GAS, GAS_PRICE * 2);

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());
    assert_eq!(status, RelayCallStatus::Ok);
    assert_eq!(charge, charge_for(14 * TGAS));
}

#[test]
fn insufficient_gas_aborts() {
    let mut f = default_setup();
    let required = f.hub.required_gas(GAS_LIMIT);

    f.ledger.begin_transaction(required - 1, GAS_PRICE);
    let err = f.relay_call(&signed_request(0)).unwrap_err();
    assert_eq!(err, HubError::InsufficientGas);

    f.ledger.begin_transaction(required, GAS_PRICE);
    assert!(f.relay_call(&signed_request(0)).is_ok());
}

// --- Precondition rejections ---

#[test]
fn sponsor_below_max_charge_is_rejected() {
    let mut f = default_setup();
    let max_charge = max_possible_charge(GAS_LIMIT, GAS_PRICE, RELAY_FEE);
    f.hub
        .withdraw(&mut f.ledger, &sponsor(), ONE_NEAR - max_charge + 1, &sponsor())
        .unwrap();

    let outcome = f.relay_call(&signed_request(0)).unwrap();

    assert_eq!(
        outcome,
        RelayCallOutcome::Rejected {
            reason: PreconditionCheck::SponsorBalanceTooLow.code()
        }
    );
    assert_eq!(f.hub.balance_of(&sponsor()), max_charge - 1);
    assert!(f.target_log.borrow().calls.is_empty());
    assert!(matches!(
        f.hub.events().last(),
        Some(HubEvent::CanRelayFailed { reason: 5, .. })
    ));
}

#[test]
fn sponsor_at_max_charge_is_relayed() {
    let mut f = default_setup();
    let max_charge = max_possible_charge(GAS_LIMIT, GAS_PRICE, RELAY_FEE);
    f.hub
        .withdraw(&mut f.ledger, &sponsor(), ONE_NEAR - max_charge, &sponsor())
        .unwrap();

    let (status, _) = relayed(f.relay_call(&signed_request(0)).unwrap());
    assert_eq!(status, RelayCallStatus::Ok);
}

#[test]
fn bad_signature_is_rejected_and_logged() {
    let mut f = default_setup();

    let outcome = f.relay_call(&sign(request(0), &relay_key())).unwrap();

    assert_eq!(outcome, RelayCallOutcome::Rejected { reason: 1 });
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR);
    assert_eq!(f.hub.balance_of(&owner()), 0);
    let event = last_event(&f.ledger);
    assert_eq!(event["event"], "RELAY_CALL");
    assert_eq!(event["data"][0]["operation"], "can_relay_failed");
    assert_eq!(event["data"][0]["reason"], 1);
}

#[test]
fn sponsor_rejection_code_passes_through() {
    let mut f = setup(
        SponsorBehavior {
            accept_status: 42,
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let outcome = f.relay_call(&signed_request(0)).unwrap();
    assert_eq!(outcome, RelayCallOutcome::Rejected { reason: 42 });
    assert_eq!(f.sponsor_log.borrow().pre_calls, 0);
}

#[test]
fn reserved_rejection_code_is_invalid_status() {
    for accept_status in 1..=MAX_RESERVED_STATUS_CODE {
        let mut f = setup(
            SponsorBehavior {
                accept_status,
                ..Default::default()
            },
            TargetBehavior::default(),
        );

        let outcome = f.relay_call(&signed_request(0)).unwrap();

        let reason = PreconditionCheck::InvalidRecipientStatusCode.code();
        assert_eq!(outcome, RelayCallOutcome::Rejected { reason });
        assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR);
        assert_eq!(f.hub.balance_of(&owner()), 0);
        assert_eq!(f.sponsor_log.borrow().pre_calls, 0);
        assert!(f.target_log.borrow().calls.is_empty());
        assert_eq!(
            f.hub.events().last(),
            Some(&HubEvent::CanRelayFailed {
                relay: relay(),
                sender: user(),
                sponsor: sponsor(),
                reason,
            })
        );
    }
}

// --- Target failures ---

#[test]
fn reverting_target_still_bills_sponsor() {
    let mut f = setup(
        SponsorBehavior::default(),
        TargetBehavior {
            reverts: true,
            ..Default::default()
        },
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RelayedCallFailed);
    assert_eq!(charge, charge_for(14 * TGAS));
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert_eq!(f.hub.balance_of(&owner()), charge);
    // target effects, including the nonce bump, are undone
    assert_eq!(f.ledger.account_nonce(&user()), 0);
    assert!(!f.sponsor_log.borrow().post_calls[0].success);
}

#[test]
fn reverting_target_undoes_its_deposits() {
    let mut f = setup(
        SponsorBehavior::default(),
        TargetBehavior {
            reverts: true,
            deposit_for: Some((other(), near(1))),
            ..Default::default()
        },
    );

    let (status, _) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RelayedCallFailed);
    assert_eq!(f.hub.balance_of(&other()), 0);
    assert_eq!(f.ledger.account_balance(&target()), near(10));
    assert!(
        !f.hub
            .events()
            .iter()
            .any(|e| matches!(e, HubEvent::Deposited { sponsor, .. } if *sponsor == other()))
    );
}

#[test]
fn target_deposit_to_third_party_is_kept() {
    let mut f = setup(
        SponsorBehavior::default(),
        TargetBehavior {
            deposit_for: Some((other(), near(1))),
            ..Default::default()
        },
    );

    let (status, _) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::Ok);
    assert_eq!(f.hub.balance_of(&other()), near(1));
}

#[test]
fn target_over_gas_limit_fails_and_bills_limit() {
    let mut f = setup(
        SponsorBehavior::default(),
        TargetBehavior {
            gas: GAS_LIMIT + 1,
            ..Default::default()
        },
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RelayedCallFailed);
    // pre 2 + target capped at 50 + post 2 + overhead 5
    assert_eq!(charge, charge_for(59 * TGAS));
    assert_eq!(f.ledger.account_nonce(&user()), 0);
}

#[test]
fn missing_target_contract_fails_call() {
    let mut f = default_setup();
    let mut request = request(0);
    request.target = other();
    let request = sign(request, &user_key());

    let (status, charge) = relayed(f.relay_call(&request).unwrap());

    assert_eq!(status, RelayCallStatus::RelayedCallFailed);
    assert_eq!(charge, charge_for(9 * TGAS));
}

// --- Hook failures ---

#[test]
fn reverting_pre_hook_skips_target() {
    let mut f = setup(
        SponsorBehavior {
            pre_reverts: true,
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::PreRelayedFailed);
    assert_eq!(charge, charge_for(7 * TGAS));
    assert!(f.target_log.borrow().calls.is_empty());
    assert!(f.sponsor_log.borrow().post_calls.is_empty());
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
}

#[test]
fn pre_hook_over_cap_fails_and_bills_cap() {
    let mut f = setup(
        SponsorBehavior {
            pre_gas: 11 * TGAS,
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::PreRelayedFailed);
    assert_eq!(charge, charge_for(15 * TGAS));
}

#[test]
fn reverting_post_hook_undoes_target() {
    let mut f = setup(
        SponsorBehavior {
            post_reverts: true,
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::PostRelayedFailed);
    assert_eq!(charge, charge_for(14 * TGAS));
    assert_eq!(f.ledger.account_nonce(&user()), 0);
    assert_eq!(f.target_log.borrow().calls.len(), 1);
    assert_eq!(f.hub.balance_of(&owner()), charge);
}

#[test]
fn aborted_attempt_can_be_relayed_again() {
    let mut f = setup(
        SponsorBehavior {
            post_reverts: true,
            ..Default::default()
        },
        TargetBehavior::default(),
    );
    let request = signed_request(0);
    let (status, first_charge) = relayed(f.relay_call(&request).unwrap());
    assert_eq!(status, RelayCallStatus::PostRelayedFailed);
    assert_eq!(f.ledger.account_nonce(&user()), 0);

    let mut contracts = ContractSet::new();
    contracts.insert_sponsor(sponsor(), TestSponsor::accepting());
    contracts.insert_target(target(), TestTarget::succeeding());
    f.contracts = contracts;
    f.ledger.begin_transaction(PREPAID_GAS, GAS_PRICE);

    let (status, second_charge) = relayed(f.relay_call(&request).unwrap());

    assert_eq!(status, RelayCallStatus::Ok);
    assert_eq!(f.ledger.account_nonce(&user()), 1);
    assert_eq!(
        f.hub.balance_of(&sponsor()),
        ONE_NEAR - first_charge - second_charge
    );
}

#[test]
fn post_hook_over_cap_fails() {
    let mut f = setup(
        SponsorBehavior {
            post_gas: 10 * TGAS + 1,
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::PostRelayedFailed);
    assert_eq!(charge, charge_for(22 * TGAS));
}

// --- Balance integrity ---

#[test]
fn sponsor_deposit_in_pre_hook_is_detected_and_reverted() {
    let mut f = setup(
        SponsorBehavior {
            pre_deposit: Some(near(1)),
            ..Default::default()
        },
        TargetBehavior::default(),
    );
    let events_before = f.hub.events().len();

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RecipientBalanceChanged);
    assert_eq!(charge, charge_for(7 * TGAS));
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert_eq!(f.ledger.account_balance(&sponsor()), near(99));
    assert!(f.target_log.borrow().calls.is_empty());
    // only the settlement event survives
    assert_eq!(f.hub.events().len(), events_before + 1);
}

#[test]
fn target_deposit_to_sponsor_is_detected() {
    let mut f = setup(
        SponsorBehavior::default(),
        TargetBehavior {
            deposit_for: Some((sponsor(), near(1))),
            ..Default::default()
        },
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RecipientBalanceChanged);
    assert_eq!(charge, charge_for(12 * TGAS));
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert_eq!(f.ledger.account_balance(&target()), near(10));
    assert_eq!(f.ledger.account_nonce(&user()), 0);
    assert!(f.sponsor_log.borrow().post_calls.is_empty());
}

#[test]
fn sponsor_withdraw_in_post_hook_is_detected() {
    let mut f = setup(
        SponsorBehavior {
            post_withdraw: Some(near(1) / 2),
            ..Default::default()
        },
        TargetBehavior::default(),
    );

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::RecipientBalanceChanged);
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert_eq!(f.ledger.account_balance(&sponsor()), near(99));
    assert_eq!(f.ledger.account_nonce(&user()), 0);
}

/// Target that tries to move value the hub holds for others.
struct DrainingTarget {
    results: Rc<RefCell<Vec<Result<(), HubError>>>>,
}

impl RelayTarget for DrainingTarget {
    fn call(&mut self, cx: &mut HubContext<'_>, _calldata: &[u8]) -> Result<Vec<u8>, CallError> {
        let deposit = cx.balance_of(&sponsor());
        let mut results = self.results.borrow_mut();
        results.push(cx.withdraw(deposit, &other()));
        results.push(cx.remove_relay_by_owner(&relay()));
        Ok(Vec::new())
    }
}

#[test]
fn target_cannot_move_value_held_for_others() {
    let mut f = default_setup();
    let results = Rc::new(RefCell::new(Vec::new()));
    f.contracts.insert_target(
        target(),
        DrainingTarget {
            results: results.clone(),
        },
    );
    let hub_native = f.ledger.account_balance(&hub_account());
    let config = f.hub.config().clone();

    let (status, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    assert_eq!(status, RelayCallStatus::Ok);
    assert_eq!(
        *results.borrow(),
        vec![Err(HubError::InsufficientFunds), Err(HubError::NotOwner)]
    );
    assert_eq!(f.ledger.account_balance(&hub_account()), hub_native);
    assert_eq!(f.ledger.account_balance(&other()), near(100));
    assert_eq!(f.hub.balance_of(&sponsor()), ONE_NEAR - charge);
    assert!(f.hub.is_registered(&relay()));
    assert_eq!(f.hub.config(), &config);

    f.hub
        .withdraw(&mut f.ledger, &sponsor(), ONE_NEAR - charge, &sponsor())
        .unwrap();
    f.hub
        .withdraw(&mut f.ledger, &owner(), charge, &owner())
        .unwrap();
    assert_eq!(f.ledger.account_balance(&hub_account()), near(2));
}

// --- Charge bound ---

#[test]
fn charge_is_capped_at_max_possible_charge() {
    let mut f = setup_with_config(HubConfig {
        gas_overhead: 100 * TGAS,
        ..Default::default()
    });
    let mut request = request(0);
    request.gas_limit = TGAS;
    let request = sign(request, &user_key());

    let (status, charge) = relayed(f.relay_call(&request).unwrap());

    assert_eq!(status, RelayCallStatus::RelayedCallFailed);
    assert_eq!(charge, max_possible_charge(TGAS, GAS_PRICE, RELAY_FEE));
}

// --- Event log ---

#[test]
fn settlement_event_is_logged() {
    let mut f = default_setup();
    let (_, charge) = relayed(f.relay_call(&signed_request(0)).unwrap());

    let event = last_event(&f.ledger);
    assert_eq!(event["standard"], "onsocial");
    assert_eq!(event["event"], "RELAY_CALL");
    let data = &event["data"][0];
    assert_eq!(data["operation"], "transaction_relayed");
    assert_eq!(data["author"], relay().as_str());
    assert_eq!(data["status"], "ok");
    assert_eq!(data["status_code"], 0);
    assert_eq!(data["charge"], charge.to_string());
}
