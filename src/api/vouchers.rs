//! Owner vouchers and customer voucher redemption.
//!
//! Voucher input is checked locally before anything is sent; the backend
//! still has the final word on every rule.

use reqwest::Method;

use super::error::{ClientResult, ValidationErrorBuilder, ValidationErrors};
use super::models::{
    Ack, CreateVoucherBody, EditVoucherBody, SizedPage, UseVoucherBody, UserVoucher, Voucher,
    VoucherInput,
};
use super::validation::{validate_date_range, validate_percent, validate_quantity, validate_required};
use super::{require_id, ApiClient, AuthPolicy, PageNumberQuery};

impl VoucherInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("name", validate_required("Voucher name", &self.name))
            .check("percent", validate_percent(self.percent))
            .check("quantity", validate_quantity(self.quantity))
            .check(
                "validTo",
                validate_date_range(self.valid_from, self.valid_to, "validFrom", "validTo"),
            );
        errors.finish()
    }
}

impl SizedPage<Voucher> {
    /// Vouchers still marked active
    pub fn active(&self) -> Vec<&Voucher> {
        self.items.iter().filter(|v| v.active).collect()
    }
}

impl ApiClient {
    pub async fn list_vouchers(&self, query: PageNumberQuery) -> ClientResult<SizedPage<Voucher>> {
        let request = self
            .request(Method::GET, "vouchers/get-voucher-by-business-owner", AuthPolicy::Required)?
            .query(query.params().pairs());
        self.send_data(request).await
    }

    pub async fn create_voucher(&self, input: &VoucherInput) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "vouchers", AuthPolicy::Required)?;
        input.validate()?;

        let body = CreateVoucherBody {
            voucher_name: input.name.trim(),
            percent: input.percent,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            quantity: input.quantity,
        };
        self.send_ack(request.json(&body)).await
    }

    pub async fn edit_voucher(&self, voucher_id: &str, input: &VoucherInput) -> ClientResult<Ack> {
        let voucher_id = require_id("voucherId", voucher_id)?;
        let request = self.request(
            Method::PATCH,
            &format!("vouchers/{}", voucher_id),
            AuthPolicy::Required,
        )?;
        input.validate()?;

        let body = EditVoucherBody {
            name: input.name.trim(),
            percent: input.percent,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            quantity: input.quantity,
        };
        self.send_ack(request.json(&body)).await
    }

    pub async fn delete_voucher(&self, voucher_id: &str) -> ClientResult<Ack> {
        let voucher_id = require_id("voucherId", voucher_id)?;
        let request = self.request(
            Method::DELETE,
            &format!("vouchers/{}", voucher_id),
            AuthPolicy::Required,
        )?;
        self.send_ack(request).await
    }

    /// Vouchers customers hold for the owner's business, optionally for one email
    pub async fn list_user_vouchers(
        &self,
        query: PageNumberQuery,
        email: Option<&str>,
    ) -> ClientResult<SizedPage<UserVoucher>> {
        let request = self
            .request(Method::GET, "vouchers/get-user-voucher-by-business", AuthPolicy::Required)?
            .query(query.params().push_opt("email", email).pairs());
        self.send_data(request).await
    }

    /// Redeem a customer's voucher
    pub async fn use_voucher(&self, voucher_id: &str, account_id: &str) -> ClientResult<Ack> {
        let voucher_id = require_id("voucherId", voucher_id)?;
        let account_id = require_id("accountId", account_id)?;
        let request = self
            .request(Method::POST, "vouchers/use-voucher", AuthPolicy::Required)?
            .json(&UseVoucherBody {
                voucher_id,
                account_id,
            });
        self.send_ack(request).await
    }
}
