//! Logical fields of the source exports and their accepted header spellings.
//!
//! Alias lists are lower-case and ordered by priority: the first alias found
//! in a header row decides the column.

use crate::parser::LogicalField;

// =============================================================================
// Customer export
// =============================================================================

/// Columns the customer reconciler knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Id,
    Email,
    FirstName,
    LastName,
    ContactPerson,
    Company,
    Address1,
    Address2,
    City,
    Province,
    ProvinceCode,
    Country,
    CountryCode,
    Zip,
    Phone,
    Website,
    Store,
    GroupId,
    CreatedAt,
    VatNumber,
    Note,
    TaxExempt,
}

impl CustomerField {
    /// Fields whose presence marks a line as the header row.
    pub const HEADER_KEYWORDS: &'static [CustomerField] = &[
        CustomerField::FirstName,
        CustomerField::LastName,
        CustomerField::ContactPerson,
        CustomerField::Company,
        CustomerField::Address1,
        CustomerField::City,
        CustomerField::Zip,
        CustomerField::Country,
        CustomerField::Phone,
    ];

    /// Minimum keyword hits for a header row without an email column.
    pub const MIN_HEADER_KEYWORDS: usize = 2;
}

impl LogicalField for CustomerField {
    const ALL: &'static [Self] = &[
        CustomerField::Id,
        CustomerField::Email,
        CustomerField::FirstName,
        CustomerField::LastName,
        CustomerField::ContactPerson,
        CustomerField::Company,
        CustomerField::Address1,
        CustomerField::Address2,
        CustomerField::City,
        CustomerField::Province,
        CustomerField::ProvinceCode,
        CustomerField::Country,
        CustomerField::CountryCode,
        CustomerField::Zip,
        CustomerField::Phone,
        CustomerField::Website,
        CustomerField::Store,
        CustomerField::GroupId,
        CustomerField::CreatedAt,
        CustomerField::VatNumber,
        CustomerField::Note,
        CustomerField::TaxExempt,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            CustomerField::Id => &["customer_id", "entity_id", "customer id"],
            CustomerField::Email => &["email", "e-mail", "email address", "e-mail address", "customer email"],
            CustomerField::FirstName => &["firstname", "first_name", "first name", "_address_firstname", "billing_firstname"],
            CustomerField::LastName => &["lastname", "last_name", "last name", "_address_lastname", "billing_lastname"],
            CustomerField::ContactPerson => &["contact person", "contact_person", "contact", "ansprechpartner", "full name", "customer name", "name"],
            CustomerField::Company => &["company", "_address_company", "company name", "billing_company", "firma"],
            CustomerField::Address1 => &["street", "_address_street", "address1", "address", "street address", "billing_street", "billing_street1", "strasse"],
            CustomerField::Address2 => &["address2", "street2", "_address_street2", "billing_street2"],
            CustomerField::City => &["city", "_address_city", "billing_city", "ort", "stadt"],
            CustomerField::Province => &["region", "_address_region", "state", "province", "billing_region"],
            CustomerField::ProvinceCode => &["region_code", "_address_region_code", "province code", "state code"],
            CustomerField::Country => &["country", "_address_country_id", "country_id", "billing_country", "billing_country_id", "land"],
            CustomerField::CountryCode => &["country code", "country_code", "country_iso"],
            CustomerField::Zip => &["postcode", "_address_postcode", "zip", "zip code", "postal code", "billing_postcode", "plz"],
            CustomerField::Phone => &["telephone", "_address_telephone", "phone", "phone number", "billing_telephone", "telefon"],
            CustomerField::Website => &["_website", "website", "website_id"],
            CustomerField::Store => &["_store", "store", "created_in", "store_id"],
            CustomerField::GroupId => &["group_id", "customer group", "group"],
            CustomerField::CreatedAt => &["created_at", "created", "registration date"],
            CustomerField::VatNumber => &["taxvat", "vat number", "vat_id", "_address_vat_id", "vat"],
            CustomerField::Note => &["note", "notes", "comment"],
            CustomerField::TaxExempt => &["tax_exempt", "tax exempt"],
        }
    }

    fn name(self) -> &'static str {
        match self {
            CustomerField::Id => "id",
            CustomerField::Email => "email",
            CustomerField::FirstName => "first_name",
            CustomerField::LastName => "last_name",
            CustomerField::ContactPerson => "contact_person",
            CustomerField::Company => "company",
            CustomerField::Address1 => "address1",
            CustomerField::Address2 => "address2",
            CustomerField::City => "city",
            CustomerField::Province => "province",
            CustomerField::ProvinceCode => "province_code",
            CustomerField::Country => "country",
            CustomerField::CountryCode => "country_code",
            CustomerField::Zip => "zip",
            CustomerField::Phone => "phone",
            CustomerField::Website => "website",
            CustomerField::Store => "store",
            CustomerField::GroupId => "group_id",
            CustomerField::CreatedAt => "created_at",
            CustomerField::VatNumber => "vat_number",
            CustomerField::Note => "note",
            CustomerField::TaxExempt => "tax_exempt",
        }
    }
}

// =============================================================================
// Product export
// =============================================================================

/// Columns the product reconciler knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Sku,
    ProductType,
    Name,
    Description,
    ShortDescription,
    Vendor,
    AttributeSet,
    Categories,
    Price,
    SpecialPrice,
    Qty,
    Weight,
    Barcode,
    Visibility,
    Status,
    Image,
    ImageLabel,
    MetaTitle,
    MetaDescription,
    ConfigurableVariations,
    ConfigurableVariationLabels,
}

impl LogicalField for ProductField {
    const ALL: &'static [Self] = &[
        ProductField::Sku,
        ProductField::ProductType,
        ProductField::Name,
        ProductField::Description,
        ProductField::ShortDescription,
        ProductField::Vendor,
        ProductField::AttributeSet,
        ProductField::Categories,
        ProductField::Price,
        ProductField::SpecialPrice,
        ProductField::Qty,
        ProductField::Weight,
        ProductField::Barcode,
        ProductField::Visibility,
        ProductField::Status,
        ProductField::Image,
        ProductField::ImageLabel,
        ProductField::MetaTitle,
        ProductField::MetaDescription,
        ProductField::ConfigurableVariations,
        ProductField::ConfigurableVariationLabels,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            ProductField::Sku => &["sku"],
            ProductField::ProductType => &["product_type", "type_id", "type"],
            ProductField::Name => &["name", "title", "product_name"],
            ProductField::Description => &["description", "body", "long_description"],
            ProductField::ShortDescription => &["short_description"],
            ProductField::Vendor => &["manufacturer", "brand", "vendor"],
            ProductField::AttributeSet => &["attribute_set_code", "_attribute_set", "attribute_set"],
            ProductField::Categories => &["categories", "category", "_category"],
            ProductField::Price => &["price"],
            ProductField::SpecialPrice => &["special_price"],
            ProductField::Qty => &["qty", "quantity", "stock_qty", "stock"],
            ProductField::Weight => &["weight"],
            ProductField::Barcode => &["barcode", "ean", "gtin", "upc"],
            ProductField::Visibility => &["visibility"],
            ProductField::Status => &["product_online", "status"],
            ProductField::Image => &["base_image", "image", "small_image", "thumbnail_image", "thumbnail"],
            ProductField::ImageLabel => &["base_image_label", "image_label", "small_image_label"],
            ProductField::MetaTitle => &["meta_title"],
            ProductField::MetaDescription => &["meta_description"],
            ProductField::ConfigurableVariations => &["configurable_variations"],
            ProductField::ConfigurableVariationLabels => &["configurable_variation_labels"],
        }
    }

    fn name(self) -> &'static str {
        match self {
            ProductField::Sku => "sku",
            ProductField::ProductType => "product_type",
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::ShortDescription => "short_description",
            ProductField::Vendor => "vendor",
            ProductField::AttributeSet => "attribute_set",
            ProductField::Categories => "categories",
            ProductField::Price => "price",
            ProductField::SpecialPrice => "special_price",
            ProductField::Qty => "qty",
            ProductField::Weight => "weight",
            ProductField::Barcode => "barcode",
            ProductField::Visibility => "visibility",
            ProductField::Status => "status",
            ProductField::Image => "image",
            ProductField::ImageLabel => "image_label",
            ProductField::MetaTitle => "meta_title",
            ProductField::MetaDescription => "meta_description",
            ProductField::ConfigurableVariations => "configurable_variations",
            ProductField::ConfigurableVariationLabels => "configurable_variation_labels",
        }
    }
}
