//! Account balance calculations.
//!
//! Asset/Expense: balance += debit - credit (debit-normal).
//! Liability/Equity/Revenue: balance += credit - debit (credit-normal).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::types::{Account, AccountType};

/// Calculates the balance change of a line in the account's natural direction.
#[must_use]
pub fn signed_movement(account_type: AccountType, debit: Decimal, credit: Decimal) -> Decimal {
    account_type.natural_sign() * (debit - credit)
}

/// Converts a natural-direction balance into a debit-positive amount.
///
/// Summing debit-positive amounts over a balanced ledger gives zero.
#[must_use]
pub fn debit_positive(account_type: AccountType, balance: Decimal) -> Decimal {
    account_type.natural_sign() * balance
}

/// Re-expresses a balance of one account type in another type's natural direction.
#[must_use]
pub fn convert_direction(balance: Decimal, from: AccountType, to: AccountType) -> Decimal {
    to.natural_sign() * debit_positive(from, balance)
}

/// Sum of debit and credit lines for one account in a date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Sum of debit amounts.
    pub total_debits: Decimal,
    /// Sum of credit amounts.
    pub total_credits: Decimal,
}

impl Movement {
    /// Creates a movement from debit and credit sums.
    #[must_use]
    pub const fn new(total_debits: Decimal, total_credits: Decimal) -> Self {
        Self {
            total_debits,
            total_credits,
        }
    }

    /// Adds a single line.
    pub fn add_line(&mut self, debit: Decimal, credit: Decimal) {
        self.total_debits += debit;
        self.total_credits += credit;
    }

    /// Returns the net change in the account's natural direction.
    #[must_use]
    pub fn signed(&self, account_type: AccountType) -> Decimal {
        signed_movement(account_type, self.total_debits, self.total_credits)
    }
}

/// Account balance at a point in time, or activity over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Opening balance included in `balance` (zero for window activity).
    pub opening_balance: Decimal,
    /// Total debit amount of the lines considered.
    pub total_debits: Decimal,
    /// Total credit amount of the lines considered.
    pub total_credits: Decimal,
    /// Net balance in the account's natural direction.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Balance of an account: opening balance plus the signed movement.
    #[must_use]
    pub fn with_opening(account: &Account, movement: Movement) -> Self {
        Self::build(account, account.opening_balance, movement)
    }

    /// Activity of an account inside a window; the opening balance is ignored.
    #[must_use]
    pub fn period_activity(account: &Account, movement: Movement) -> Self {
        Self::build(account, Decimal::ZERO, movement)
    }

    fn build(account: &Account, opening_balance: Decimal, movement: Movement) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            opening_balance,
            total_debits: movement.total_debits,
            total_credits: movement.total_credits,
            balance: opening_balance + movement.signed(account.account_type),
        }
    }

    /// Returns the balance as a debit-positive amount.
    #[must_use]
    pub fn debit_positive(&self) -> Decimal {
        debit_positive(self.account_type, self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn account(account_type: AccountType, opening_balance: Decimal) -> Account {
        Account {
            id: AccountId::new(),
            code: "ACC".to_string(),
            name: "Account".to_string(),
            description: None,
            account_type,
            parent_id: None,
            opening_balance,
            current_balance: opening_balance,
            is_active: true,
            is_system_account: false,
            created_at: Utc::now(),
        }
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn account_type_strategy() -> impl Strategy<Value = AccountType> {
        prop::sample::select(AccountType::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A debit moves every debit-normal account up and every credit-normal account down.
        #[test]
        fn prop_debit_follows_natural_sign(
            account_type in account_type_strategy(),
            amount in amount_strategy(),
        ) {
            let change = signed_movement(account_type, amount, Decimal::ZERO);
            prop_assert_eq!(change, account_type.natural_sign() * amount);
        }

        /// Debiting and crediting the same amount leaves the balance unchanged.
        #[test]
        fn prop_offsetting_lines_cancel(
            account_type in account_type_strategy(),
            amount in amount_strategy(),
        ) {
            let mut movement = Movement::default();
            movement.add_line(amount, Decimal::ZERO);
            movement.add_line(Decimal::ZERO, amount);
            prop_assert_eq!(movement.signed(account_type), Decimal::ZERO);
        }

        /// Converting into another direction and back is lossless.
        #[test]
        fn prop_convert_direction_round_trip(
            from in account_type_strategy(),
            to in account_type_strategy(),
            balance in amount_strategy(),
        ) {
            let there = convert_direction(balance, from, to);
            prop_assert_eq!(convert_direction(there, to, from), balance);
        }

        /// Balance equals opening plus signed movement.
        #[test]
        fn prop_balance_is_opening_plus_movement(
            account_type in account_type_strategy(),
            opening in amount_strategy(),
            debits in amount_strategy(),
            credits in amount_strategy(),
        ) {
            let acc = account(account_type, opening);
            let balance = AccountBalance::with_opening(&acc, Movement::new(debits, credits));
            prop_assert_eq!(
                balance.balance,
                opening + signed_movement(account_type, debits, credits)
            );
        }
    }

    #[test]
    fn test_debit_normal_balance_change() {
        assert_eq!(signed_movement(AccountType::Asset, dec!(100), dec!(0)), dec!(100));
        assert_eq!(signed_movement(AccountType::Expense, dec!(0), dec!(50)), dec!(-50));
        assert_eq!(signed_movement(AccountType::Asset, dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_credit_normal_balance_change() {
        assert_eq!(signed_movement(AccountType::Revenue, dec!(0), dec!(100)), dec!(100));
        assert_eq!(signed_movement(AccountType::Liability, dec!(50), dec!(0)), dec!(-50));
        assert_eq!(signed_movement(AccountType::Equity, dec!(30), dec!(100)), dec!(70));
    }

    #[test]
    fn test_period_activity_ignores_opening() {
        let acc = account(AccountType::Revenue, dec!(250));
        let movement = Movement::new(dec!(0), dec!(1000));

        assert_eq!(AccountBalance::with_opening(&acc, movement).balance, dec!(1250));
        let activity = AccountBalance::period_activity(&acc, movement);
        assert_eq!(activity.balance, dec!(1000));
        assert_eq!(activity.opening_balance, Decimal::ZERO);
        assert_eq!(activity.debit_positive(), dec!(-1000));
    }

    #[test]
    fn test_convert_contra_child() {
        // A debit-normal child of a credit-normal parent reduces the parent.
        assert_eq!(
            convert_direction(dec!(40), AccountType::Expense, AccountType::Revenue),
            dec!(-40)
        );
        assert_eq!(
            convert_direction(dec!(40), AccountType::Asset, AccountType::Asset),
            dec!(40)
        );
    }
}
