//! Initial migration for the store of record.
//!
//! Creates the enums, accounts, categories, installments, transactions and
//! installment_payments tables with their indexes and check constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTS & CATEGORIES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;

        // ============================================================
        // PART 3: INSTALLMENTS
        // ============================================================
        db.execute_unprepared(INSTALLMENTS_SQL).await?;

        // ============================================================
        // PART 4: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 5: INSTALLMENT PAYMENTS
        // ============================================================
        db.execute_unprepared(INSTALLMENT_PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account kinds
CREATE TYPE account_kind AS ENUM (
    'bank',
    'cash',
    'credit',
    'investment',
    'e_wallet'
);

-- Category direction
CREATE TYPE category_kind AS ENUM ('expense', 'income');

-- Transaction kinds
CREATE TYPE transaction_kind AS ENUM (
    'expense',
    'income',
    'transfer_out',
    'transfer_in',
    'installment_payment'
);

-- Transaction lifecycle
CREATE TYPE transaction_status AS ENUM ('posted', 'voided');

-- Stored installment state; overdue is derived at read time
CREATE TYPE installment_status AS ENUM ('active', 'completed');
";

// Amount columns are unconstrained NUMERIC: progress accounting stores the
// unrounded period amount, so a fixed scale would silently round it.
const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    kind account_kind NOT NULL,
    balance NUMERIC NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (owner_id, name)
);

CREATE INDEX idx_accounts_owner ON accounts(owner_id) WHERE is_active = true;
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    kind category_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (owner_id, name, kind)
);

CREATE INDEX idx_categories_owner ON categories(owner_id);
";

const INSTALLMENTS_SQL: &str = r"
CREATE TABLE installments (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    title VARCHAR(255) NOT NULL,
    principal NUMERIC NOT NULL,
    term_count INTEGER NOT NULL,
    periodic_rate_percent NUMERIC NOT NULL,
    due_date DATE NOT NULL,
    paid_periods INTEGER NOT NULL DEFAULT 0,
    total_paid NUMERIC NOT NULL DEFAULT 0,
    remaining_amount NUMERIC NOT NULL,
    status installment_status NOT NULL DEFAULT 'active',
    notes TEXT,
    replay_key UUID UNIQUE,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_principal_positive CHECK (principal > 0),
    CONSTRAINT chk_term_positive CHECK (term_count > 0),
    CONSTRAINT chk_rate_not_negative CHECK (periodic_rate_percent >= 0),
    CONSTRAINT chk_paid_periods_range CHECK (
        paid_periods >= 0 AND paid_periods <= term_count
    )
);

CREATE INDEX idx_installments_owner ON installments(owner_id, status);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    kind transaction_kind NOT NULL,
    status transaction_status NOT NULL DEFAULT 'posted',
    amount NUMERIC NOT NULL,
    counterparty_account_id UUID REFERENCES accounts(id),
    category_id UUID,
    installment_id UUID REFERENCES installments(id),
    date DATE NOT NULL,
    notes TEXT,
    replay_key UUID UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_counterparty_only_for_transfers CHECK (
        (counterparty_account_id IS NOT NULL)
        = (kind IN ('transfer_out', 'transfer_in'))
    ),
    CONSTRAINT chk_category_for_flows CHECK (
        kind NOT IN ('expense', 'income') OR category_id IS NOT NULL
    )
);

CREATE INDEX idx_txn_owner_date ON transactions(owner_id, date DESC);
CREATE INDEX idx_txn_account ON transactions(account_id);
CREATE INDEX idx_txn_owner_kind ON transactions(owner_id, kind);
CREATE INDEX idx_txn_installment ON transactions(installment_id)
    WHERE installment_id IS NOT NULL;
";

const INSTALLMENT_PAYMENTS_SQL: &str = r"
CREATE TABLE installment_payments (
    id UUID PRIMARY KEY,
    installment_id UUID NOT NULL REFERENCES installments(id) ON DELETE CASCADE,
    period_number INTEGER NOT NULL,
    amount NUMERIC NOT NULL,
    date DATE NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_number_positive CHECK (period_number > 0),
    UNIQUE (installment_id, period_number)
);

CREATE INDEX idx_installment_payments_plan ON installment_payments(installment_id);
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS installment_payments CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS installments CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

-- Drop enums
DROP TYPE IF EXISTS installment_status CASCADE;
DROP TYPE IF EXISTS transaction_status CASCADE;
DROP TYPE IF EXISTS transaction_kind CASCADE;
DROP TYPE IF EXISTS category_kind CASCADE;
DROP TYPE IF EXISTS account_kind CASCADE;
";
