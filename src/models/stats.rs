use rust_decimal::Decimal;
use serde::Deserialize;

/// One day of `/analysis/dailySales`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailySales {
    #[serde(default, deserialize_with = "super::string_or_null")]
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sales: Decimal,
}

/// Scalar statistics served by the `/analysis` endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKey {
    TotalSales,
    CustomerCount,
    ProductCount,
    AccountantCount,
    InvoiceCount,
    CompletedOrders,
    TodaysOrders,
    TodaysSales,
    TodaysCustomers,
    WeeklySales,
    WeeklyCustomers,
    AverageOrderValue,
    AveragePricePerProduct,
    PendingAmount,
    InventoryValue,
}

impl StatKey {
    pub fn path(&self) -> &'static str {
        match self {
            StatKey::TotalSales => "/analysis/totalSales",
            StatKey::CustomerCount => "/analysis/countCustomer",
            StatKey::ProductCount => "/analysis/countProducts",
            StatKey::AccountantCount => "/analysis/countAccountant",
            StatKey::InvoiceCount => "/analysis/countInvoices",
            StatKey::CompletedOrders => "/analysis/completedOrders",
            StatKey::TodaysOrders => "/analysis/todaysOrder",
            StatKey::TodaysSales => "/analysis/todaysSale",
            StatKey::TodaysCustomers => "/analysis/todayscustomer",
            StatKey::WeeklySales => "/analysis/weekSales",
            StatKey::WeeklyCustomers => "/analysis/weeksCustomer",
            StatKey::AverageOrderValue => "/analysis/avgorderValue",
            StatKey::AveragePricePerProduct => "/analysis/avgpricePerProd",
            StatKey::PendingAmount => "/analysis/pending-amount",
            StatKey::InventoryValue => "/analysis/invValue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatKey::TotalSales => "Total Sales",
            StatKey::CustomerCount => "Customers",
            StatKey::ProductCount => "Products",
            StatKey::AccountantCount => "Accountants",
            StatKey::InvoiceCount => "No of Orders",
            StatKey::CompletedOrders => "Completed Orders",
            StatKey::TodaysOrders => "Today's Orders",
            StatKey::TodaysSales => "Today's Sales",
            StatKey::TodaysCustomers => "New Customers Today",
            StatKey::WeeklySales => "Weekly Sales",
            StatKey::WeeklyCustomers => "Weekly Customers Added",
            StatKey::AverageOrderValue => "Average Order Value",
            StatKey::AveragePricePerProduct => "Average Price per Product",
            StatKey::PendingAmount => "Pending Amount",
            StatKey::InventoryValue => "Inventory Value",
        }
    }

    /// Whether the value is an amount of money rather than a count
    pub fn is_money(&self) -> bool {
        matches!(
            self,
            StatKey::TotalSales
                | StatKey::TodaysSales
                | StatKey::WeeklySales
                | StatKey::AverageOrderValue
                | StatKey::AveragePricePerProduct
                | StatKey::PendingAmount
                | StatKey::InventoryValue
        )
    }
}
