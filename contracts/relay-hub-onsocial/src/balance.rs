use near_sdk::AccountId;

use crate::{HubError, HubEvent, Ledger, RelayHub};

impl RelayHub {
    /// Move `amount` from `caller`'s native balance into `sponsor`'s hub balance.
    /// The cap applies per call; balances may accumulate past it.
    pub fn deposit_for(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        sponsor: &AccountId,
        amount: u128,
    ) -> Result<(), HubError> {
        if amount > self.config.max_deposit.0 {
            return Err(HubError::DepositTooLarge);
        }
        let balance = self
            .balance_of(sponsor)
            .checked_add(amount)
            .ok_or_else(|| HubError::InvalidInput("balance overflow".into()))?;

        let hub = ledger.hub_account().clone();
        ledger.transfer(caller, &hub, amount)?;

        self.set_balance(sponsor, balance);
        self.emit(
            ledger,
            HubEvent::Deposited {
                sponsor: sponsor.clone(),
                from: caller.clone(),
                amount,
            },
        );
        Ok(())
    }

    pub fn withdraw(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        amount: u128,
        destination: &AccountId,
    ) -> Result<(), HubError> {
        let balance = self
            .balance_of(caller)
            .checked_sub(amount)
            .ok_or(HubError::InsufficientFunds)?;

        let hub = ledger.hub_account().clone();
        ledger.transfer(&hub, destination, amount)?;

        self.set_balance(caller, balance);
        self.emit(
            ledger,
            HubEvent::Withdrawn {
                account: caller.clone(),
                dest: destination.clone(),
                amount,
            },
        );
        Ok(())
    }

    pub fn balance_of(&self, account_id: &AccountId) -> u128 {
        self.balances.get(account_id).copied().unwrap_or(0)
    }

    pub(crate) fn charge(&mut self, sponsor: &AccountId, amount: u128) -> Result<(), HubError> {
        let balance = self
            .balance_of(sponsor)
            .checked_sub(amount)
            .ok_or(HubError::InsufficientFunds)?;
        self.set_balance(sponsor, balance);
        Ok(())
    }

    pub(crate) fn credit(&mut self, account_id: &AccountId, amount: u128) {
        let balance = self.balance_of(account_id).saturating_add(amount);
        self.set_balance(account_id, balance);
    }

    fn set_balance(&mut self, account_id: &AccountId, amount: u128) {
        if amount == 0 {
            self.balances.remove(account_id);
        } else {
            self.balances.insert(account_id.clone(), amount);
        }
    }
}
