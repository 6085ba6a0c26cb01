//! Per-resource operations.
//!
//! Brands, categories, parts and sellers expose the same two verbs. One
//! [`Resource`] binding carries them for whichever [`ResourceKind`] it was
//! created for.

use crate::client::{ApiResult, ClientError, OctopartClient, RequestHandle};
use crate::request::ApiRequest;
use octopart_query::{
    encode_facets, encode_filters, encode_search_args, encode_stats, encode_uids, escape,
    FacetSpec, FilterSpec, Ids, QueryArgs, QueryParams, StatSpec,
};
use std::fmt;
use std::str::FromStr;

/// The four entity types served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Manufacturers
    Brand,
    /// Part categories
    Category,
    /// Parts
    Part,
    /// Distributors
    Seller,
}

impl ResourceKind {
    /// Every kind, in path order.
    pub const ALL: [Self; 4] = [Self::Brand, Self::Category, Self::Part, Self::Seller];

    /// Collection path segment (e.g. `parts`).
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Brand => "brands",
            Self::Category => "categories",
            Self::Part => "parts",
            Self::Seller => "sellers",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ResourceKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brand" | "brands" => Ok(Self::Brand),
            "category" | "categories" => Ok(Self::Category),
            "part" | "parts" => Ok(Self::Part),
            "seller" | "sellers" => Ok(Self::Seller),
            other => Err(ClientError::InvalidRequest(format!(
                "unknown resource kind: {other}"
            ))),
        }
    }
}

/// Operations bound to one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    client: &'a OctopartClient,
    kind: ResourceKind,
}

impl<'a> Resource<'a> {
    pub(crate) fn new(client: &'a OctopartClient, kind: ResourceKind) -> Self {
        Self { client, kind }
    }

    /// Kind this binding serves.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Build a lookup by identifier.
    ///
    /// One id fetches `<collection>/<id>`; a list fetches
    /// `<collection>/get_multi` with one `uid[]` per id, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for an empty id or id list.
    pub fn build_by_id(
        &self,
        ids: impl Into<Ids>,
        filters: Option<&FilterSpec>,
    ) -> Result<ApiRequest, ClientError> {
        let collection = self.kind.collection();
        match ids.into() {
            Ids::One(id) if id.is_empty() => Err(ClientError::InvalidRequest(format!(
                "{collection} lookup needs a non-empty uid"
            ))),
            Ids::One(id) => Ok(self.client.build_request(
                &format!("{collection}/{}", escape(&id)),
                QueryParams::new(),
                filters,
            )),
            Ids::Many(ids) if ids.is_empty() => Err(ClientError::InvalidRequest(format!(
                "{collection} lookup needs at least one uid"
            ))),
            Ids::Many(ids) => Ok(self.client.build_request(
                &format!("{collection}/get_multi"),
                encode_uids(&ids),
                filters,
            )),
        }
    }

    /// Look up one or more entities by identifier.
    ///
    /// # Errors
    ///
    /// Returns error on invalid ids, network or API errors.
    pub async fn by_id(&self, ids: impl Into<Ids>, filters: Option<&FilterSpec>) -> ApiResult {
        let request = self.build_by_id(ids, filters)?;
        self.client.send(&request).await
    }

    /// Callback form of [`Self::by_id`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn by_id_with_callback(
        &self,
        ids: impl Into<Ids>,
        filters: Option<&FilterSpec>,
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        self.client
            .dispatch_built(self.build_by_id(ids, filters), Box::new(callback))
    }

    /// Build a search over this collection.
    #[must_use]
    pub fn build_search(&self, args: &[QueryArgs], filters: Option<&FilterSpec>) -> ApiRequest {
        self.client.build_request(
            &format!("{}/search", self.kind.collection()),
            encode_search_args(args),
            filters,
        )
    }

    /// Search this collection.
    ///
    /// # Errors
    ///
    /// Returns error on network or API errors.
    pub async fn search(&self, args: &[QueryArgs], filters: Option<&FilterSpec>) -> ApiResult {
        let request = self.build_search(args, filters);
        self.client.send(&request).await
    }

    /// Callback form of [`Self::search`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn search_with_callback(
        &self,
        args: &[QueryArgs],
        filters: Option<&FilterSpec>,
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        self.client
            .dispatch(self.build_search(args, filters), Some(Box::new(callback)))
    }

    /// Build a search that also requests facet and stat aggregations.
    ///
    /// Fragments follow the order search args, filters, facets, stats.
    #[must_use]
    pub fn build_search_with_aggregates(
        &self,
        args: &[QueryArgs],
        filters: Option<&FilterSpec>,
        facets: Option<&FacetSpec>,
        stats: Option<&StatSpec>,
    ) -> ApiRequest {
        let mut params = encode_search_args(args);
        if let Some(filters) = filters {
            params.append(encode_filters(filters));
        }
        if let Some(facets) = facets {
            params.append(encode_facets(facets));
        }
        if let Some(stats) = stats {
            params.append(encode_stats(stats));
        }
        self.client
            .build_request(&format!("{}/search", self.kind.collection()), params, None)
    }

    /// Search with facet and stat aggregations.
    ///
    /// # Errors
    ///
    /// Returns error on network or API errors.
    pub async fn search_with_aggregates(
        &self,
        args: &[QueryArgs],
        filters: Option<&FilterSpec>,
        facets: Option<&FacetSpec>,
        stats: Option<&StatSpec>,
    ) -> ApiResult {
        let request = self.build_search_with_aggregates(args, filters, facets, stats);
        self.client.send(&request).await
    }

    /// Callback form of [`Self::search_with_aggregates`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn search_with_aggregates_with_callback(
        &self,
        args: &[QueryArgs],
        filters: Option<&FilterSpec>,
        facets: Option<&FacetSpec>,
        stats: Option<&StatSpec>,
        callback: impl FnOnce(ApiResult) + Send + 'static,
    ) -> RequestHandle {
        let request = self.build_search_with_aggregates(args, filters, facets, stats);
        self.client.dispatch(request, Some(Box::new(callback)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopart_query::Transform;

    fn client() -> OctopartClient {
        OctopartClient::v3("KEY").unwrap()
    }

    #[test]
    fn kind_paths() {
        let paths: Vec<_> = ResourceKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(paths, ["brands", "categories", "parts", "sellers"]);
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("part".parse::<ResourceKind>().unwrap(), ResourceKind::Part);
        assert_eq!(
            "categories".parse::<ResourceKind>().unwrap(),
            ResourceKind::Category
        );
        assert!("widgets".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn single_id_is_direct_lookup() {
        let client = client();
        for kind in ResourceKind::ALL {
            let req = client.resource(kind).build_by_id("abc123", None).unwrap();
            assert_eq!(req.path(), format!("/api/v3/{kind}/abc123"));
            assert!(req.params().is_empty());
        }
    }

    #[test]
    fn id_list_uses_get_multi() {
        let req = client().brands().build_by_id(["a", "b"], None).unwrap();
        assert_eq!(
            req.url(),
            "https://octopart.com/api/v3/brands/get_multi?uid[]=a&uid[]=b&apikey=KEY"
        );
    }

    #[test]
    fn by_id_filters_follow_uids() {
        let filters = FilterSpec::new().show(["mpn"]).slice("offers", "0:2");
        let req = client()
            .parts()
            .build_by_id(vec!["x", "y"], Some(&filters))
            .unwrap();
        assert_eq!(
            req.query_string(),
            "uid[]=x&uid[]=y&show[]=mpn&slice[offers]=0%3A2&apikey=KEY"
        );
    }

    #[test]
    fn empty_filters_add_nothing() {
        let req = client()
            .parts()
            .build_by_id(["a", "b"], Some(&FilterSpec::new()))
            .unwrap();
        assert_eq!(req.query_string(), "uid[]=a&uid[]=b&apikey=KEY");

        let req = client()
            .brands()
            .build_by_id("abc", Some(&FilterSpec::new()))
            .unwrap();
        assert_eq!(req.query_string(), "apikey=KEY");
    }

    #[test]
    fn empty_ids_are_rejected() {
        let client = client();
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            client.sellers().build_by_id(empty, None),
            Err(ClientError::InvalidRequest(_))
        ));
        assert!(client.sellers().build_by_id("", None).is_err());
    }

    #[test]
    fn search_concatenates_query_objects() {
        let args = [QueryArgs::q("lm358"), QueryArgs::new().param("start", 10)];
        let req = client().parts().build_search(&args, None);
        assert_eq!(
            req.url(),
            "https://octopart.com/api/v3/parts/search?q=lm358&start=10&apikey=KEY"
        );
    }

    #[test]
    fn search_with_aggregates_order() {
        let filters = FilterSpec::new().hide(["offers"]);
        let facets = FacetSpec::new().include("brand.name", true);
        let stats = StatSpec::new().with("specs.capacitance.value", Transform::Limit, 3);

        let req = client().parts().build_search_with_aggregates(
            &[QueryArgs::q("cap")],
            Some(&filters),
            Some(&facets),
            Some(&stats),
        );

        assert_eq!(
            req.query_string(),
            "q=cap\
             &hide[]=offers\
             &facet[fields][brand.name][include]=true\
             &stats[fields][specs.capacitance.value][limit]=3\
             &apikey=KEY"
        );
    }
}
